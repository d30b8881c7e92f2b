//! The `comcol clean` command.
//!
//! Removes everything comcol generated in the working root. The runtime
//! module under `modulefiles/cc` survives so loaded shells keep working.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::CleanArgs;
use crate::config::SettingsFile;
use crate::error::Result;
use crate::state::CACHE_FILE;
use crate::ui::{Confirmation, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::profile::PROFILE_FILE;

const MODULEFILES_DIR: &str = "modulefiles";

/// Directories a local build may have created.
const BUILT_DIRS: &[&str] = &["lmod", "lua", "singularity", "spack"];

pub struct CleanCommand {
    root: PathBuf,
    settings: Option<PathBuf>,
    args: CleanArgs,
}

impl CleanCommand {
    pub fn new(root: &Path, settings: Option<&Path>, args: CleanArgs) -> Self {
        Self {
            root: root.to_path_buf(),
            settings: settings.map(Path::to_path_buf),
            args,
        }
    }

    /// Existing paths that would be removed.
    pub fn targets(&self) -> Result<Vec<PathBuf>> {
        let mut targets = vec![
            SettingsFile::locate(&self.root, self.settings.as_deref())
                .path()
                .to_path_buf(),
            self.root.join(CACHE_FILE),
            self.root.join("logs"),
            self.root.join(PROFILE_FILE),
        ];

        let modulefiles = self.root.join(MODULEFILES_DIR);
        if modulefiles.is_dir() {
            let mut entries = Vec::new();
            for entry in fs::read_dir(&modulefiles)? {
                let entry = entry?;
                if entry.file_name() != "cc" {
                    entries.push(entry.path());
                }
            }
            entries.sort();
            targets.extend(entries);
        }

        targets.extend(BUILT_DIRS.iter().map(|d| self.root.join(d)));
        targets.retain(|p| fs::symlink_metadata(p).is_ok());
        Ok(targets)
    }
}

fn remove(path: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

impl Command for CleanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let targets = self.targets()?;
        if targets.is_empty() {
            ui.message("Nothing to clean.");
            return Ok(CommandResult::success());
        }

        ui.message("The following will be deleted:");
        for path in &targets {
            ui.message(&format!("  {}", path.display()));
        }

        if !self.args.sure
            && !ui.confirm(&Confirmation::new("clean", "Delete these files?"))?
        {
            ui.warning("Nothing deleted.");
            return Ok(CommandResult::success());
        }

        for path in &targets {
            tracing::debug!("removing {}", path.display());
            remove(path)?;
        }
        ui.success(&format!("Removed {} item(s)", targets.len()));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn populated() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("cc.yaml"), "whitelist: {}\n").unwrap();
        fs::write(root.join(CACHE_FILE), "{}").unwrap();
        fs::create_dir_all(root.join("modulefiles/cc")).unwrap();
        fs::write(root.join("modulefiles/cc/singularity.lua"), "--").unwrap();
        fs::create_dir_all(root.join("modulefiles/python")).unwrap();
        fs::create_dir_all(root.join("lmod/lmod")).unwrap();
        fs::write(root.join("notes.txt"), "keep me").unwrap();
        temp
    }

    #[test]
    fn targets_skip_runtime_module_and_unrelated_files() {
        let temp = populated();
        let cmd = CleanCommand::new(temp.path(), None, CleanArgs::default());

        let targets = cmd.targets().unwrap();

        assert!(targets.contains(&temp.path().join("cc.yaml")));
        assert!(targets.contains(&temp.path().join("modulefiles/python")));
        assert!(targets.contains(&temp.path().join("lmod")));
        assert!(!targets.contains(&temp.path().join("modulefiles/cc")));
        assert!(!targets.iter().any(|p| p.ends_with("notes.txt")));
        assert!(!targets.iter().any(|p| p.ends_with("logs")));
    }

    #[test]
    fn declining_keeps_everything() {
        let temp = populated();
        let mut ui = MockUI::new();
        ui.set_confirm_response("clean", false);

        CleanCommand::new(temp.path(), None, CleanArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(temp.path().join("cc.yaml").exists());
        assert_eq!(ui.prompts_shown(), ["clean"]);
    }

    #[test]
    fn sure_deletes_without_asking() {
        let temp = populated();
        let mut ui = MockUI::new();

        CleanCommand::new(temp.path(), None, CleanArgs { sure: true })
            .execute(&mut ui)
            .unwrap();

        assert!(ui.prompts_shown().is_empty());
        assert!(!temp.path().join("cc.yaml").exists());
        assert!(!temp.path().join("modulefiles/python").exists());
        assert!(!temp.path().join("lmod").exists());
        assert!(temp.path().join("modulefiles/cc/singularity.lua").exists());
        assert!(temp.path().join("notes.txt").exists());
    }

    #[test]
    fn empty_root_has_nothing_to_clean() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        CleanCommand::new(temp.path(), None, CleanArgs::default())
            .execute(&mut ui)
            .unwrap();
        assert_eq!(ui.messages(), ["Nothing to clean."]);
    }
}
