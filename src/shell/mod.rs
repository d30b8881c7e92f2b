//! Shell command execution and host environment checks.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{execute, CommandOptions, CommandResult, ShellRunner, SystemShell};
pub use mock::MockShell;
pub use platform::{is_ci, is_elevated, is_executable, resolve_tool_path, split_path_var};
