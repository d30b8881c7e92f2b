//! The `comcol showcache` command.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::state::CacheStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

pub struct ShowcacheCommand {
    root: PathBuf,
}

impl ShowcacheCommand {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl Command for ShowcacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let cache = CacheStore::load(&self.root)?;
        ui.message(&format!("# {}", cache.path().display()));
        ui.message(&cache.to_pretty_json()?);
        Ok(CommandResult::success())
    }
}
