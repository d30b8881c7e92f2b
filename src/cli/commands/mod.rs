//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`]. Commands that touch the host take their shell,
//! registry client or home directory through a `with_*`/`run_with` seam so
//! tests can drive them with mocks.

pub mod capable;
pub mod clean;
pub mod completions;
pub mod dispatcher;
pub mod profile;
pub mod refresh;
pub mod showcache;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
