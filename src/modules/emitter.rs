//! Writing modulefiles to disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::request::ModuleRequest;
use super::templates::{render_runtime_module, BaseModule};

/// Hidden base file every version link points at.
pub const BASE_FILE: &str = ".base.lua";

/// Files touched while emitting one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub base: PathBuf,
    /// Version links created this run.
    pub created: Vec<PathBuf>,
    /// Version links that already existed.
    pub kept: Vec<PathBuf>,
}

/// Writes modulefiles under one modulefiles root.
#[derive(Debug, Clone)]
pub struct ModuleEmitter {
    root: PathBuf,
    images_dir: String,
}

impl ModuleEmitter {
    pub fn new(root: &Path, images_dir: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            images_dir: images_dir.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the modulefiles root and write the runtime module into it.
    pub fn prepare(&self, runtime_prefix: &Path) -> Result<PathBuf> {
        let path = self.root.join("cc").join("singularity.lua");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, render_runtime_module(runtime_prefix))?;
        tracing::debug!("wrote {}", path.display());
        Ok(path)
    }

    /// Rewrite the base file for `request` and link each version to it.
    ///
    /// Existing version links are left alone.
    pub fn emit(&self, request: &ModuleRequest, versions: &[String]) -> Result<EmitReport> {
        let dir = self.root.join(&request.name);
        fs::create_dir_all(&dir)?;

        let base = dir.join(BASE_FILE);
        fs::write(&base, BaseModule::for_request(request, &self.images_dir).render())?;

        let mut report = EmitReport {
            base,
            ..Default::default()
        };
        for version in versions {
            let link = dir.join(format!("{}.lua", version));
            if fs::symlink_metadata(&link).is_ok() {
                report.kept.push(link);
                continue;
            }
            link_to_base(&dir, &link)?;
            tracing::debug!("linked {}", link.display());
            report.created.push(link);
        }
        Ok(report)
    }
}

#[cfg(unix)]
fn link_to_base(_dir: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(BASE_FILE, link)
}

#[cfg(not(unix))]
fn link_to_base(dir: &Path, link: &Path) -> std::io::Result<()> {
    fs::copy(dir.join(BASE_FILE), link).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Source, WhitelistEntry};
    use tempfile::TempDir;

    fn request() -> ModuleRequest {
        ModuleRequest::from_entry(
            "python",
            &WhitelistEntry::Version(">=3.6".into()),
            Source::Docker,
        )
    }

    #[test]
    fn prepare_writes_runtime_module() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("modulefiles");
        let emitter = ModuleEmitter::new(&root, "~/.cc_images");

        let path = emitter.prepare(Path::new("/opt/singularity")).unwrap();

        assert_eq!(path, root.join("cc/singularity.lua"));
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("/opt/singularity/bin"));
    }

    #[test]
    fn emits_base_and_version_links() {
        let temp = TempDir::new().unwrap();
        let emitter = ModuleEmitter::new(temp.path(), "~/.cc_images");

        let report = emitter
            .emit(&request(), &["3.6".into(), "3.7".into()])
            .unwrap();

        assert_eq!(report.created.len(), 2);
        assert!(report.base.ends_with("python/.base.lua"));
        let link = temp.path().join("python/3.7.lua");
        assert_eq!(
            fs::read_to_string(&link).unwrap(),
            fs::read_to_string(&report.base).unwrap()
        );
        #[cfg(unix)]
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from(BASE_FILE));
    }

    #[test]
    fn existing_links_are_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let emitter = ModuleEmitter::new(temp.path(), "~/.cc_images");
        fs::create_dir_all(temp.path().join("python")).unwrap();
        fs::write(temp.path().join("python/3.6.lua"), "-- custom").unwrap();

        let report = emitter.emit(&request(), &["3.6".into()]).unwrap();
        assert!(report.created.is_empty());
        assert_eq!(report.kept.len(), 1);
        assert_eq!(
            fs::read_to_string(temp.path().join("python/3.6.lua")).unwrap(),
            "-- custom"
        );

        let again = emitter.emit(&request(), &["3.6".into(), "3.7".into()]).unwrap();
        assert_eq!(again.created, vec![temp.path().join("python/3.7.lua")]);
    }
}
