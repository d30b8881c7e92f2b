//! The `comcol refresh` command.
//!
//! Runs one orchestration pass, reports what happened and records the pass
//! in the internal cache. A pass that leaves errors behind ends with the
//! "edit settings" error after each error has been shown.

use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::cli::args::RefreshArgs;
use crate::config::SettingsFile;
use crate::deps::{DependencyStatus, SessionContext};
use crate::error::Result;
use crate::shell::SystemShell;
use crate::state::CacheStore;
use crate::ui::UserInterface;
use crate::usecase::{Orchestrator, Outcome, Phase, RefreshOptions};
use crate::version::SourceTags;

use super::dispatcher::{Command, CommandResult};

pub struct RefreshCommand {
    root: PathBuf,
    settings: Option<PathBuf>,
    args: RefreshArgs,
}

impl RefreshCommand {
    pub fn new(root: &Path, settings: Option<&Path>, args: RefreshArgs) -> Self {
        Self {
            root: root.to_path_buf(),
            settings: settings.map(Path::to_path_buf),
            args,
        }
    }

    /// Run the pass with a prepared orchestrator.
    pub fn run_with(
        &self,
        ui: &mut dyn UserInterface,
        orchestrator: &Orchestrator<'_>,
    ) -> Result<CommandResult> {
        let file = SettingsFile::locate(&self.root, self.settings.as_deref());
        if file.kickstart()? {
            ui.message(&format!(
                "Wrote default settings to {}",
                file.path().display()
            ));
        }
        let mut ctx = SessionContext::new(file.load()?, &self.root);
        let mut cache = CacheStore::load(&self.root)?;

        ui.show_header(if self.args.dry_run {
            "refresh (dry run)"
        } else {
            "refresh"
        });

        let options = RefreshOptions {
            dry_run: self.args.dry_run,
            ..Default::default()
        };
        let mut spinner = ui.start_spinner("Resolving dependencies");
        let outcome = match orchestrator.refresh(&mut ctx, &file, options) {
            Ok(outcome) => outcome,
            Err(e) => {
                spinner.finish_error("Refresh failed");
                return Err(e);
            }
        };
        match outcome.phase {
            Phase::Advanced => spinner.finish_success("Dependencies ready"),
            Phase::Blocked => spinner.finish_error("Dependencies need attention"),
        }

        self.report(ui, &outcome);

        if outcome.case.is_some() {
            cache.case = outcome.case.clone();
        }
        cache.errors = ctx.errors.clone();
        cache.traceback_off = !ctx.errors.is_empty();
        cache.last_refresh = Some(Utc::now());
        cache.record_command(if self.args.dry_run {
            "refresh --dry-run"
        } else {
            "refresh"
        });
        cache.save()?;

        for (key, record) in ctx.errors.iter() {
            let mut body = record.message.clone();
            if let Some(trace) = &record.trace {
                body.push_str("\n\n");
                body.push_str(trace);
            }
            ui.error_block(key, &body);
        }

        outcome.into_result(&ctx, file.path().to_path_buf())?;
        ui.success(if self.args.dry_run {
            "Dry run complete, no modulefiles written"
        } else {
            "Modulefiles up to date"
        });
        Ok(CommandResult::success())
    }

    fn report(&self, ui: &mut dyn UserInterface, outcome: &Outcome) {
        for state in &outcome.states {
            let label = state.identity.label();
            match (state.status, &state.location) {
                (DependencyStatus::Ready, Some(location)) => {
                    ui.success(&format!("{} at {}", label, location.display()))
                }
                (DependencyStatus::Failed, _) => ui.error(&format!("{} failed to build", label)),
                _ => ui.warning(&format!("{} needs a settings edit", label)),
            }
        }

        for module in &outcome.modules {
            let created = module.report.as_ref().map_or(0, |r| r.created.len());
            ui.message(&format!(
                "  {} {}: {} ({} new)",
                module.name,
                module.constraint,
                module.versions.join(", "),
                created
            ));
        }
    }
}

impl Command for RefreshCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let shell = SystemShell;
        let tags = SourceTags::public()?;
        let orchestrator = Orchestrator::new(&shell, &tags);
        self.run_with(ui, &orchestrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::{Dependency, Lmod, Singularity};
    use crate::shell::MockShell;
    use crate::ui::{MockUI, OutputMode};
    use crate::version::StaticTags;
    use std::fs;
    use tempfile::TempDir;

    fn isolated() -> Vec<Box<dyn Dependency>> {
        vec![
            Box::new(Singularity::with_env(|_| None).with_fallback(Vec::new())),
            Box::new(Lmod::with_env(|_| None).with_defaults(Vec::new())),
        ]
    }

    #[test]
    fn empty_root_kickstarts_and_asks_for_edits() {
        let temp = TempDir::new().unwrap();
        let shell = MockShell::with_default(1);
        let tags = StaticTags::new(["latest"]);
        let orchestrator = Orchestrator::with_dependencies(&shell, &tags, isolated());
        let mut ui = MockUI::new();

        let err = RefreshCommand::new(temp.path(), None, RefreshArgs::default())
            .run_with(&mut ui, &orchestrator)
            .unwrap_err();

        assert!(err.is_user_edit());
        assert!(temp.path().join("cc.yaml").exists());
        let titles: Vec<&str> = ui.error_blocks().iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(titles, ["lmod", "singularity"]);

        let cache = CacheStore::load(temp.path()).unwrap();
        assert!(cache.traceback_off);
        assert!(cache.case.is_none());
        assert_eq!(cache.commands[0].command, "refresh");
    }

    #[test]
    fn ready_dependencies_emit_and_update_cache() {
        let temp = TempDir::new().unwrap();
        let sing = temp.path().join("sing");
        fs::create_dir_all(&sing).unwrap();
        fs::create_dir_all(temp.path().join("lmod")).unwrap();
        fs::write(
            temp.path().join("cc.yaml"),
            format!(
                "whitelist:\n  python: '3.6'\nsingularity:\n  path: {}\nlmod:\n  root: ./lmod\n  modulefiles: ./modulefiles\n",
                sing.display()
            ),
        )
        .unwrap();
        let shell = MockShell::new();
        let tags = StaticTags::new(["3.6", "3.7"]);
        let orchestrator = Orchestrator::with_dependencies(&shell, &tags, isolated());
        let mut ui = MockUI::new();

        let result = RefreshCommand::new(temp.path(), None, RefreshArgs::default())
            .run_with(&mut ui, &orchestrator)
            .unwrap();

        assert!(result.success);
        assert!(temp.path().join("modulefiles/python/3.6.lua").exists());
        assert!(ui.has_output("python ==3.6: 3.6 (1 new)"));
        let cache = CacheStore::load(temp.path()).unwrap();
        assert_eq!(cache.case.unwrap().singularity, sing);
        assert!(cache.errors.is_empty());
        assert!(!cache.traceback_off);
    }

    fn failed_build_block(mode: OutputMode) -> (String, String) {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("cc.yaml"),
            "singularity:\n  build: ./singularity\nlmod:\n  root: NEEDS_LMOD_PATH\n",
        )
        .unwrap();
        let shell = MockShell::with_default(1);
        let tags = StaticTags::new(["latest"]);
        let orchestrator = Orchestrator::with_dependencies(&shell, &tags, isolated());
        let mut ui = MockUI::with_mode(mode);

        let _ = RefreshCommand::new(temp.path(), None, RefreshArgs::default())
            .run_with(&mut ui, &orchestrator);

        let (_, body) = ui
            .error_blocks()
            .iter()
            .find(|(t, _)| t == "singularity")
            .unwrap()
            .clone();
        let cache = CacheStore::load(temp.path()).unwrap();
        let message = cache.errors.get("singularity").unwrap().message.clone();
        (body, message)
    }

    #[test]
    fn error_blocks_carry_the_trace_in_every_mode() {
        for mode in [OutputMode::Quiet, OutputMode::Normal, OutputMode::Verbose] {
            let (body, message) = failed_build_block(mode);
            assert!(body.starts_with(&message));
            assert!(body.len() > message.len());
        }
    }

    #[test]
    fn dry_run_is_logged_as_such() {
        let temp = TempDir::new().unwrap();
        let shell = MockShell::with_default(1);
        let tags = StaticTags::new(["latest"]);
        let orchestrator = Orchestrator::with_dependencies(&shell, &tags, isolated());
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        let _ = RefreshCommand::new(temp.path(), None, RefreshArgs { dry_run: true })
            .run_with(&mut ui, &orchestrator);

        assert_eq!(ui.headers(), ["refresh (dry run)"]);
        let cache = CacheStore::load(temp.path()).unwrap();
        assert_eq!(cache.commands[0].command, "refresh --dry-run");
    }
}
