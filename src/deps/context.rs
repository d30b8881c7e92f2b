//! Shared mutable state for one run.

use std::path::{Path, PathBuf};

use super::errors::ErrorRegistry;
use super::DependencyKind;
use crate::config::{resolve_path, DependencyBlock, Settings};

/// Settings and error registry shared by every manager in a run.
///
/// Managers run one after another and receive the context by `&mut`.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub settings: Settings,
    pub errors: ErrorRegistry,
    root: PathBuf,
}

impl SessionContext {
    pub fn new(settings: Settings, root: &Path) -> Self {
        Self {
            settings,
            errors: ErrorRegistry::new(),
            root: root.to_path_buf(),
        }
    }

    /// Working root that relative settings paths are anchored at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a settings path against the working root.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        resolve_path(&self.root, raw)
    }

    /// Directory for diagnostic build logs.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Replace a dependency's settings block, keeping its `modulefiles` value.
    pub fn set_block(&mut self, kind: DependencyKind, mut block: DependencyBlock) {
        let slot = self.settings.block_slot(kind);
        if block.modulefiles.is_none() {
            block.modulefiles = slot.as_ref().and_then(|b| b.modulefiles.clone());
        }
        *slot = Some(block);
    }

    /// Record a resolved location under the dependency's location key.
    pub fn set_location(&mut self, kind: DependencyKind, location: &Path) {
        let text = location.display().to_string();
        let block = match kind.location_key() {
            "path" => DependencyBlock {
                path: Some(text),
                ..Default::default()
            },
            _ => DependencyBlock {
                root: Some(text),
                ..Default::default()
            },
        };
        self.set_block(kind, block);
    }

    /// Stage shell-init lines for a dependency, replacing what it staged before.
    pub fn stage_profile(&mut self, kind: DependencyKind, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        self.settings
            .profile_mut()
            .mods
            .insert(kind.key().to_string(), lines);
    }
}
