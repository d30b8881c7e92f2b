//! The `comcol capable` and `comcol enable` commands.

use std::path::{Path, PathBuf};

use crate::deps::{CapabilityReport, Dependency, Singularity};
use crate::error::Result;
use crate::shell::{is_elevated, ShellRunner, SystemShell};
use crate::state::CacheStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

pub struct CapableCommand {
    root: PathBuf,
    fix: bool,
    prefix: Option<PathBuf>,
}

impl CapableCommand {
    /// `fix` runs the suggested commands (`enable`).
    pub fn new(root: &Path, fix: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            fix,
            prefix: None,
        }
    }

    /// Inspect the runtime at `prefix` instead of looking it up.
    pub fn with_prefix(mut self, prefix: &Path) -> Self {
        self.prefix = Some(prefix.to_path_buf());
        self
    }

    /// The last resolved runtime, else whatever auto-detection finds.
    fn runtime_prefix(&self) -> Result<Option<PathBuf>> {
        if let Some(prefix) = &self.prefix {
            return Ok(Some(prefix.clone()));
        }
        let cache = CacheStore::load(&self.root)?;
        Ok(cache
            .case
            .map(|case| case.singularity)
            .or_else(|| Singularity::new().probe()))
    }

    /// Check, and with `fix` repair, using `shell` for the repairs.
    pub fn run_with(
        &self,
        ui: &mut dyn UserInterface,
        shell: &dyn ShellRunner,
        elevated: bool,
    ) -> Result<CommandResult> {
        let Some(prefix) = self.runtime_prefix()? else {
            ui.error("Cannot find Singularity; run `comcol refresh` first.");
            return Ok(CommandResult::failure(1));
        };

        let report = CapabilityReport::inspect(&prefix);
        for finding in &report.findings {
            match &finding.problem {
                None => ui.success(&finding.path.display().to_string()),
                Some(problem) => ui.warning(&format!("{}: {}", finding.path.display(), problem)),
            }
        }

        if report.has_missing() {
            ui.error(&format!(
                "The Singularity install at {} is incomplete",
                prefix.display()
            ));
            return Ok(CommandResult::failure(1));
        }
        if report.is_capable() {
            ui.success("Singularity can run containers without root");
            return Ok(CommandResult::success());
        }

        if !self.fix {
            ui.message("Run these as root, or run `comcol enable` as root:");
            for command in &report.fixes {
                ui.message(&format!("  {}", command));
            }
            return Ok(CommandResult::success());
        }

        if !elevated {
            ui.error("`comcol enable` changes file ownership and must run as root");
            return Ok(CommandResult::failure(1));
        }
        report.apply(shell)?;
        ui.success("Singularity can run containers without root");
        Ok(CommandResult::success())
    }
}

impl Command for CapableCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        self.run_with(ui, &SystemShell, is_elevated())
    }
}
