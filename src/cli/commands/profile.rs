//! The `comcol profile` command.
//!
//! Refresh stages shell-init lines in the settings document under
//! `profile.mods`. This command writes them to a script and offers to hook
//! the script into `~/.bashrc`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::args::ProfileArgs;
use crate::config::SettingsFile;
use crate::error::Result;
use crate::ui::{Confirmation, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Default profile script in the working root.
pub const PROFILE_FILE: &str = "profile_cc.sh";

pub struct ProfileCommand {
    root: PathBuf,
    settings: Option<PathBuf>,
    args: ProfileArgs,
    bashrc: Option<PathBuf>,
}

impl ProfileCommand {
    pub fn new(root: &Path, settings: Option<&Path>, args: ProfileArgs) -> Self {
        Self {
            root: root.to_path_buf(),
            settings: settings.map(Path::to_path_buf),
            args,
            bashrc: dirs::home_dir().map(|home| home.join(".bashrc")),
        }
    }

    /// Edit `path` instead of `~/.bashrc`.
    pub fn with_bashrc(mut self, path: &Path) -> Self {
        self.bashrc = Some(path.to_path_buf());
        self
    }

    fn profile_path(&self) -> PathBuf {
        match &self.args.profile {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => self.root.join(p),
            None => self.root.join(PROFILE_FILE),
        }
    }

    /// Append `lines` to the bashrc after confirmation.
    fn offer_bashrc(
        &self,
        ui: &mut dyn UserInterface,
        bashrc: &Path,
        staged: &[String],
        proposed: &[String],
    ) -> Result<CommandResult> {
        let existing = match fs::read_to_string(bashrc) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        let present: Vec<&String> = staged
            .iter()
            .chain(proposed)
            .filter(|line| existing.lines().any(|l| l.trim() == line.trim()))
            .collect();
        if let Some(line) = present.first() {
            ui.warning(&format!(
                "{} already contains `{}`; edit it by hand",
                bashrc.display(),
                line
            ));
            return Ok(CommandResult::success());
        }

        ui.message(&format!("Proposed additions to {}:", bashrc.display()));
        for line in proposed {
            ui.message(&format!("  {}", line));
        }
        let prompt = Confirmation::new("bashrc", &format!("Append to {}?", bashrc.display()));
        if !ui.confirm(&prompt)? {
            ui.warning(&format!("{} left unchanged", bashrc.display()));
            return Ok(CommandResult::success());
        }

        let mut file = OpenOptions::new().create(true).append(true).open(bashrc)?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            writeln!(file)?;
        }
        writeln!(file, "# added by comcol")?;
        for line in proposed {
            writeln!(file, "{}", line)?;
        }
        ui.success(&format!("Updated {}", bashrc.display()));
        Ok(CommandResult::success())
    }
}

impl Command for ProfileCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = SettingsFile::locate(&self.root, self.settings.as_deref()).load()?;
        let staged = settings
            .profile
            .as_ref()
            .map(|p| p.lines())
            .unwrap_or_default();
        if staged.is_empty() {
            ui.warning("No shell-init lines staged yet; run `comcol refresh` first.");
            return Ok(CommandResult::success());
        }

        let profile = self.profile_path();
        let mut script = String::from("# generated by comcol\n");
        for line in &staged {
            script.push_str(line);
            script.push('\n');
        }
        fs::write(&profile, script)?;
        ui.success(&format!("Wrote {}", profile.display()));

        if self.args.no_bashrc {
            return Ok(CommandResult::success());
        }
        let Some(bashrc) = self.bashrc.as_deref() else {
            ui.warning("Cannot locate a home directory; skipping ~/.bashrc");
            return Ok(CommandResult::success());
        };

        let proposed = if self.args.explicit {
            staged.clone()
        } else {
            vec![format!("source {}", profile.display())]
        };
        self.offer_bashrc(ui, bashrc, &staged, &proposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    const STAGED: &str = "\
profile:
  mods:
    lmod:
      - export MODULEPATH=/srv/cc/modulefiles
      - source /srv/cc/lmod/lmod/init/bash
";

    fn staged_root() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("cc.yaml"), STAGED).unwrap();
        temp
    }

    #[test]
    fn writes_profile_and_sources_it_from_bashrc() {
        let temp = staged_root();
        let bashrc = temp.path().join("bashrc");
        fs::write(&bashrc, "alias ll='ls -l'").unwrap();
        let mut ui = MockUI::new();
        ui.set_confirm_response("bashrc", true);

        ProfileCommand::new(temp.path(), None, ProfileArgs::default())
            .with_bashrc(&bashrc)
            .execute(&mut ui)
            .unwrap();

        let profile = fs::read_to_string(temp.path().join(PROFILE_FILE)).unwrap();
        assert!(profile.contains("export MODULEPATH=/srv/cc/modulefiles\n"));
        let rc = fs::read_to_string(&bashrc).unwrap();
        assert!(rc.starts_with("alias ll='ls -l'\n"));
        assert!(rc.contains(&format!(
            "source {}",
            temp.path().join(PROFILE_FILE).display()
        )));
    }

    #[test]
    fn explicit_appends_the_lines_themselves() {
        let temp = staged_root();
        let bashrc = temp.path().join("bashrc");
        let mut ui = MockUI::new();
        ui.set_confirm_response("bashrc", true);
        let args = ProfileArgs {
            explicit: true,
            ..Default::default()
        };

        ProfileCommand::new(temp.path(), None, args)
            .with_bashrc(&bashrc)
            .execute(&mut ui)
            .unwrap();

        let rc = fs::read_to_string(&bashrc).unwrap();
        assert!(rc.contains("source /srv/cc/lmod/lmod/init/bash"));
        assert!(!rc.contains(PROFILE_FILE));
    }

    #[test]
    fn refuses_when_bashrc_already_has_a_line() {
        let temp = staged_root();
        let bashrc = temp.path().join("bashrc");
        fs::write(&bashrc, "export MODULEPATH=/srv/cc/modulefiles\n").unwrap();
        let mut ui = MockUI::new();
        ui.set_confirm_response("bashrc", true);

        ProfileCommand::new(temp.path(), None, ProfileArgs::default())
            .with_bashrc(&bashrc)
            .execute(&mut ui)
            .unwrap();

        assert!(ui.prompts_shown().is_empty());
        assert!(ui.warnings()[0].contains("already contains"));
        assert_eq!(
            fs::read_to_string(&bashrc).unwrap(),
            "export MODULEPATH=/srv/cc/modulefiles\n"
        );
    }

    #[test]
    fn no_bashrc_only_writes_script() {
        let temp = staged_root();
        let bashrc = temp.path().join("bashrc");
        let args = ProfileArgs {
            no_bashrc: true,
            profile: Some(PathBuf::from("custom.sh")),
            ..Default::default()
        };
        let mut ui = MockUI::new();

        ProfileCommand::new(temp.path(), None, args)
            .with_bashrc(&bashrc)
            .execute(&mut ui)
            .unwrap();

        assert!(temp.path().join("custom.sh").exists());
        assert!(!bashrc.exists());
    }

    #[test]
    fn nothing_staged_is_a_warning() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("cc.yaml"), "whitelist: {}\n").unwrap();
        let mut ui = MockUI::new();

        ProfileCommand::new(temp.path(), None, ProfileArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(!temp.path().join(PROFILE_FILE).exists());
        assert_eq!(ui.warnings().len(), 1);
    }
}
