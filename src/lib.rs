//! comcol - community software collections on top of containers.
//!
//! comcol makes sure a container runtime (Singularity) and a module system
//! (Lmod) are present, detecting or building them as the settings document
//! asks, then writes one Lmod modulefile per whitelisted software version.
//! Loading a module pulls the matching container image on first use.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings document loading, defaults and paths
//! - [`deps`] - Dependency detect/build state machine
//! - [`error`] - Error types and result aliases
//! - [`modules`] - Modulefile templates and emission
//! - [`shell`] - Shell command execution
//! - [`state`] - Internal cache between runs
//! - [`ui`] - Terminal output, spinners and prompts
//! - [`usecase`] - One refresh pass from settings to modulefiles
//! - [`version`] - Version constraints and registry tags
//!
//! # Example
//!
//! ```
//! use comcol::version::{resolve, ResolverPolicy, VersionConstraint};
//!
//! let tags = vec!["3.6".to_string(), "3.6-slim".to_string(), "3.7".to_string()];
//! let accepted = resolve(&VersionConstraint::parse("3.6"), &tags, ResolverPolicy::default());
//! assert_eq!(accepted, vec!["3.6"]);
//! ```

pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod modules;
pub mod shell;
pub mod state;
pub mod ui;
pub mod usecase;
pub mod version;

pub use error::{ComcolError, Result};
