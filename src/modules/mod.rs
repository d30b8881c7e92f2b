//! Modulefile generation for whitelisted software.
//!
//! Each whitelist entry becomes a [`ModuleRequest`]. The [`ModuleEmitter`]
//! writes one hidden base file per module and one link per resolved version,
//! so Lmod's own version ordering picks the default.

pub mod emitter;
pub mod request;
pub mod templates;

pub use emitter::{EmitReport, ModuleEmitter, BASE_FILE};
pub use request::ModuleRequest;
pub use templates::{lua_string, render_runtime_module, BaseModule, ShellFunction, RUNTIME_MODULE};
