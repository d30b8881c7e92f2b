//! Settings document discovery, loading and saving.

use crate::config::schema::{DependencyBlock, Settings};
use crate::error::{ComcolError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default name of the settings document in the working root.
pub const SETTINGS_FILE: &str = "cc.yaml";

/// Document written when no settings exist yet.
pub const DEFAULT_SETTINGS: &str = "\
whitelist:
  julia: versionless
images: ~/.cc_images
";

/// Sentinel asking for container runtime auto-detection.
pub const SINGULARITY_SENTINEL: &str = "NEEDS_SINGULARITY_PATH";

/// Sentinel asking for module system auto-detection.
pub const LMOD_SENTINEL: &str = "NEEDS_LMOD_PATH";

/// Sentinel asking for package manager auto-detection.
pub const SPACK_SENTINEL: &str = "NEEDS_SPACK_PATH";

/// Default location of generated modulefiles.
pub const DEFAULT_MODULEFILES: &str = "./modulefiles";

/// Top-level keys from older documents that are dropped before a run.
const OBSOLETE_KEYS: &[&str] = &["report", "bashrc"];

/// Handle on the settings document.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// Use `override_path` if given, else `cc.yaml` in `root`.
    pub fn locate(root: &Path, override_path: Option<&Path>) -> Self {
        let path = match override_path {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => root.join(p),
            None => root.join(SETTINGS_FILE),
        };
        Self { path }
    }

    /// Path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the document exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the default document if none exists.
    ///
    /// Returns `true` when a new document was written.
    pub fn kickstart(&self) -> Result<bool> {
        if self.exists() {
            tracing::debug!("found settings at {}", self.path.display());
            return Ok(false);
        }
        tracing::info!("writing default settings to {}", self.path.display());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, DEFAULT_SETTINGS)?;
        Ok(true)
    }

    /// Load the document exactly as written.
    ///
    /// # Errors
    ///
    /// Returns `SettingsNotFound` if the file doesn't exist.
    /// Returns `SettingsParseError` if the YAML is invalid.
    pub fn load_raw(&self) -> Result<Settings> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ComcolError::SettingsNotFound {
                    path: self.path.clone(),
                }
            } else {
                ComcolError::Io(e)
            }
        })?;
        parse_settings(&content, &self.path)
    }

    /// Load the document with defaults filled in and obsolete keys removed.
    pub fn load(&self) -> Result<Settings> {
        let mut settings = resolve_defaults(self.load_raw()?);
        strip_obsolete(&mut settings);
        Ok(settings)
    }

    /// Save the document using write-to-temp-then-rename.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let content =
            serde_yaml::to_string(settings).map_err(|e| ComcolError::InvalidSettings {
                message: format!("Failed to serialize settings: {}", e),
            })?;

        let temp_path = self.path.with_extension("yaml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;
        tracing::debug!("wrote settings to {}", self.path.display());
        Ok(())
    }
}

/// Parse YAML content into `Settings`.
pub fn parse_settings(content: &str, source_path: &Path) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(content).map_err(|e| ComcolError::SettingsParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Fill in missing top-level blocks with their auto-detect defaults.
///
/// The merge is top-level only: a present block is never altered.
pub fn resolve_defaults(mut settings: Settings) -> Settings {
    if settings.singularity.is_none() {
        settings.singularity = Some(DependencyBlock {
            path: Some(SINGULARITY_SENTINEL.to_string()),
            ..Default::default()
        });
    }
    if settings.lmod.is_none() {
        settings.lmod = Some(DependencyBlock {
            root: Some(LMOD_SENTINEL.to_string()),
            modulefiles: Some(DEFAULT_MODULEFILES.to_string()),
            ..Default::default()
        });
    }
    settings
}

/// Drop keys that older documents carried but nothing reads any more.
pub fn strip_obsolete(settings: &mut Settings) {
    for key in OBSOLETE_KEYS {
        settings.extra.remove(*key);
    }
}
