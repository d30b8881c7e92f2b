//! Internal cache kept between runs.
//!
//! The cache never holds settings. It remembers the last resolved case, the
//! last error snapshot and a short command log, so `showcache` can explain
//! what the previous run did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::deps::ErrorRegistry;
use crate::error::{ComcolError, Result};
use crate::usecase::CaseRecord;

/// Cache file name in the working root.
pub const CACHE_FILE: &str = "cache.json";

/// One logged invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    pub when: DateTime<Utc>,
    pub command: String,
}

/// Persistent cache contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStore {
    /// Schema version for migration.
    pub version: u32,

    /// Locations from the last successful dependency pass.
    #[serde(default)]
    pub case: Option<CaseRecord>,

    /// Errors registered by the last run.
    #[serde(default)]
    pub errors: ErrorRegistry,

    /// Set when the last run ended in a deliberate "edit settings" halt.
    #[serde(default)]
    pub traceback_off: bool,

    #[serde(default)]
    pub last_refresh: Option<DateTime<Utc>>,

    /// Recent invocations, newest last.
    #[serde(default)]
    pub commands: Vec<CommandEntry>,

    #[serde(skip)]
    path: PathBuf,

    /// Serialized form as loaded, for change detection.
    #[serde(skip)]
    snapshot: Option<String>,
}

impl CacheStore {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Number of logged commands to keep.
    pub const COMMAND_RETENTION: usize = 50;

    /// An empty cache that will be saved at `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            case: None,
            errors: ErrorRegistry::new(),
            traceback_off: false,
            last_refresh: None,
            commands: Vec::new(),
            path: path.to_path_buf(),
            snapshot: None,
        }
    }

    /// Cache file for a working root.
    pub fn file(root: &Path) -> PathBuf {
        root.join(CACHE_FILE)
    }

    /// Load the cache for `root`, or start an empty one.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::file(root);
        if !path.exists() {
            return Ok(Self::new(&path));
        }

        let content = fs::read_to_string(&path)?;
        let mut cache: Self =
            serde_json::from_str(&content).map_err(|e| ComcolError::InvalidSettings {
                message: format!("Failed to parse {}: {}", path.display(), e),
            })?;
        cache.path = path;
        cache.snapshot = Some(cache.to_pretty_json()?);
        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save using write-to-temp-then-rename. Returns `false` when nothing changed.
    pub fn save(&mut self) -> Result<bool> {
        let content = self.to_pretty_json()?;
        if self.snapshot.as_deref() == Some(content.as_str()) {
            tracing::debug!("cache unchanged, skipping write");
            return Ok(false);
        }

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;
        self.snapshot = Some(content);
        Ok(true)
    }

    /// Append an invocation to the command log.
    pub fn record_command(&mut self, command: &str) {
        self.commands.push(CommandEntry {
            when: Utc::now(),
            command: command.to_string(),
        });
        if self.commands.len() > Self::COMMAND_RETENTION {
            let excess = self.commands.len() - Self::COMMAND_RETENTION;
            self.commands.drain(..excess);
        }
    }

    /// Pretty JSON for display.
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ComcolError::InvalidSettings {
            message: format!("Failed to serialize cache: {}", e),
        })
    }
}
