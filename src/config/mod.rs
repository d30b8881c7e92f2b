//! Settings document loading, schema and path handling.
//!
//! - Schema definitions in [`schema`]
//! - Discovery, defaults and atomic saving in [`loader`]
//! - Path expansion and normalisation in [`paths`]
//!
//! # Example
//!
//! ```
//! use comcol::config::SettingsFile;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let file = SettingsFile::locate(temp.path(), None);
//! file.kickstart().unwrap();
//!
//! let settings = file.load().unwrap();
//! assert!(settings.whitelist.contains_key("julia"));
//! assert!(settings.lmod.is_some());
//! ```

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::{
    parse_settings, resolve_defaults, strip_obsolete, SettingsFile, DEFAULT_MODULEFILES,
    DEFAULT_SETTINGS, LMOD_SENTINEL, SETTINGS_FILE, SINGULARITY_SENTINEL, SPACK_SENTINEL,
};
pub use paths::{basename, expand_tilde, normalize, resolve_path};
pub use schema::{
    Calls, DependencyBlock, ModuleSettings, ProfileBlock, Settings, Source, WhitelistDetail,
    WhitelistEntry,
};
