//! Auto-detection of existing installs.
//!
//! Probes look at environment variables first and fall back to well-known
//! locations. Lookups go through an injectable function so tests never
//! depend on the host environment.

use std::path::{Path, PathBuf};

use crate::config::normalize;
use crate::shell::{is_executable, resolve_tool_path};

/// Environment variable lookup.
pub type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Lookup backed by the process environment.
pub fn system_env() -> EnvLookup {
    Box::new(|key: &str| std::env::var(key).ok())
}

/// An environment variable naming a path some levels below the install root.
#[derive(Debug, Clone, Copy)]
pub struct EnvHint {
    pub var: &'static str,
    pub levels_up: usize,
}

/// Walk `levels` parents up from `path`.
pub fn ancestor(path: &Path, levels: usize) -> Option<PathBuf> {
    let mut current = normalize(path);
    for _ in 0..levels {
        current = current.parent()?.to_path_buf();
    }
    if current.as_os_str().is_empty() {
        None
    } else {
        Some(current)
    }
}

/// Find an install root containing `binary_subpath`.
///
/// Environment hints are checked in order, then `defaults`.
pub fn probe_location(
    hints: &[EnvHint],
    defaults: &[PathBuf],
    binary_subpath: &str,
    env: &dyn Fn(&str) -> Option<String>,
) -> Option<PathBuf> {
    let from_env = hints.iter().find_map(|hint| {
        let value = env(hint.var)?;
        let root = ancestor(Path::new(&value), hint.levels_up)?;
        if root.join(binary_subpath).exists() {
            tracing::debug!("found {} via {}", binary_subpath, hint.var);
            Some(root)
        } else {
            None
        }
    });

    from_env.or_else(|| {
        defaults
            .iter()
            .find(|root| root.join(binary_subpath).exists())
            .map(|root| normalize(root))
    })
}

/// Find `binary` on the given search directories and return its install prefix
/// (the directory above `bin`).
pub fn probe_binary_prefix(binary: &str, search: &[PathBuf]) -> Option<PathBuf> {
    let found = resolve_tool_path(binary, search)?;
    tracing::debug!("found {} at {}", binary, found.display());
    ancestor(&found, 2)
}

/// If `path` is an executable file named `binary` inside a `bin` directory,
/// return the prefix above it. Otherwise return `path` unchanged.
pub fn prefix_of_binary(path: &Path, binary: &str) -> PathBuf {
    let normalized = normalize(path);
    let is_binary = normalized.file_name().is_some_and(|n| n == binary)
        && normalized.is_file()
        && is_executable(&normalized);
    let in_bin = normalized
        .parent()
        .and_then(|p| p.file_name())
        .is_some_and(|n| n == "bin");

    if is_binary && in_bin {
        if let Some(prefix) = ancestor(&normalized, 2) {
            return prefix;
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch_executable(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn ancestor_walks_up() {
        assert_eq!(
            ancestor(Path::new("/opt/apps/lmod/lmod/libexec/lmod"), 3),
            Some(PathBuf::from("/opt/apps/lmod"))
        );
        assert_eq!(ancestor(Path::new("lmod"), 1), None);
    }

    #[test]
    fn env_hint_is_checked_before_defaults() {
        let temp = TempDir::new().unwrap();
        let env_root = temp.path().join("env/lmod");
        let default_root = temp.path().join("default/lmod");
        touch_executable(&env_root.join("lmod/libexec/lmod"));
        touch_executable(&default_root.join("lmod/libexec/lmod"));

        let cmd = env_root.join("lmod/libexec/lmod").display().to_string();
        let env = move |key: &str| (key == "LMOD_CMD").then(|| cmd.clone());
        let hints = [EnvHint {
            var: "LMOD_CMD",
            levels_up: 3,
        }];

        let found = probe_location(&hints, &[default_root.clone()], "lmod/libexec/lmod", &env);
        assert_eq!(found, Some(env_root));

        let found = probe_location(&hints, &[default_root.clone()], "lmod/libexec/lmod", &|_| None);
        assert_eq!(found, Some(default_root));
    }

    #[test]
    fn probe_returns_none_when_nothing_found() {
        let temp = TempDir::new().unwrap();
        let found = probe_location(&[], &[temp.path().join("nope")], "bin/spack", &|_| None);
        assert!(found.is_none());
    }

    #[test]
    fn binary_prefix_is_grandparent() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("usr/bin");
        touch_executable(&bin.join("singularity"));

        let prefix = probe_binary_prefix("singularity", &[bin.clone()]);
        assert_eq!(prefix, Some(normalize(&temp.path().join("usr"))));
        assert_eq!(
            prefix_of_binary(&bin.join("singularity"), "singularity"),
            normalize(&temp.path().join("usr"))
        );
        assert_eq!(
            prefix_of_binary(&temp.path().join("usr"), "singularity"),
            normalize(&temp.path().join("usr"))
        );
    }
}
