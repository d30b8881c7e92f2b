//! Command dispatching.
//!
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, RefreshArgs};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    root: PathBuf,
    settings: Option<PathBuf>,
}

impl CommandDispatcher {
    pub fn new(root: PathBuf, settings: Option<PathBuf>) -> Self {
        Self { root, settings }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Route the CLI subcommand to its implementation and run it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.settings.as_deref();
        match &cli.command {
            Some(Commands::Refresh(args)) => {
                super::refresh::RefreshCommand::new(&self.root, settings, args.clone())
                    .execute(ui)
            }
            Some(Commands::Clean(args)) => {
                super::clean::CleanCommand::new(&self.root, settings, args.clone()).execute(ui)
            }
            Some(Commands::Profile(args)) => {
                super::profile::ProfileCommand::new(&self.root, settings, args.clone())
                    .execute(ui)
            }
            Some(Commands::Showcache) => {
                super::showcache::ShowcacheCommand::new(&self.root).execute(ui)
            }
            Some(Commands::Capable) => {
                super::capable::CapableCommand::new(&self.root, false).execute(ui)
            }
            Some(Commands::Enable) => {
                super::capable::CapableCommand::new(&self.root, true).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => super::refresh::RefreshCommand::new(
                &self.root,
                settings,
                RefreshArgs::default(),
            )
            .execute(ui),
        }
    }
}
