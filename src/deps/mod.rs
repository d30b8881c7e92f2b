//! External dependency managers.
//!
//! Each dependency (container runtime, module system, package manager) is
//! located or installed by a [`DependencyManager`] driving a
//! [`Dependency`] implementation through the detect/build/report cycle.
//!
//! # Example
//!
//! ```
//! use comcol::config::{resolve_defaults, Settings};
//! use comcol::deps::{DependencyKind, DependencyManager, DependencyStatus, Lmod, SessionContext};
//! use comcol::shell::MockShell;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let mut ctx = SessionContext::new(resolve_defaults(Settings::default()), temp.path());
//! let shell = MockShell::with_default(1);
//! let lmod = Lmod::with_env(|_| None);
//! let manager = DependencyManager::new(&lmod, &shell);
//!
//! let state = manager.run(&mut ctx);
//! assert_eq!(state.status, DependencyStatus::NeedsEdit);
//! assert!(ctx.errors.contains(DependencyKind::ModuleSystem.key()));
//! ```

pub mod build;
pub mod capability;
pub mod context;
pub mod errors;
pub mod health;
pub mod lmod;
pub mod manager;
pub mod probe;
pub mod singularity;
pub mod spack;

pub use build::{BuildLog, BuildPlan, BuildStep, ScopedWorkdir};
pub use capability::{CapabilityReport, Finding};
pub use context::SessionContext;
pub use errors::{ErrorRecord, ErrorRegistry};
pub use health::HealthCheck;
pub use lmod::Lmod;
pub use manager::{Dependency, DependencyManager};
pub use probe::EnvLookup;
pub use singularity::Singularity;
pub use spack::Spack;

use std::fmt;
use std::path::PathBuf;

use crate::config::{DependencyBlock, LMOD_SENTINEL, SINGULARITY_SENTINEL, SPACK_SENTINEL};

/// Which external dependency a manager is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    ContainerRuntime,
    ModuleSystem,
    PackageManager,
}

impl DependencyKind {
    /// All kinds in resolution order.
    pub const ALL: [DependencyKind; 3] = [
        DependencyKind::ContainerRuntime,
        DependencyKind::ModuleSystem,
        DependencyKind::PackageManager,
    ];

    /// Settings key and error registry key.
    pub fn key(&self) -> &'static str {
        match self {
            DependencyKind::ContainerRuntime => "singularity",
            DependencyKind::ModuleSystem => "lmod",
            DependencyKind::PackageManager => "spack",
        }
    }

    /// Key holding the location inside the settings block.
    pub fn location_key(&self) -> &'static str {
        match self {
            DependencyKind::ContainerRuntime => "path",
            DependencyKind::ModuleSystem | DependencyKind::PackageManager => "root",
        }
    }

    /// Location value that asks for auto-detection.
    pub fn sentinel(&self) -> &'static str {
        match self {
            DependencyKind::ContainerRuntime => SINGULARITY_SENTINEL,
            DependencyKind::ModuleSystem => LMOD_SENTINEL,
            DependencyKind::PackageManager => SPACK_SENTINEL,
        }
    }

    /// Suggested build path written back when detection fails.
    pub fn default_build_path(&self) -> String {
        format!("./{}", self.key())
    }

    /// Human-readable product name.
    pub fn label(&self) -> &'static str {
        match self {
            DependencyKind::ContainerRuntime => "Singularity",
            DependencyKind::ModuleSystem => "Lmod",
            DependencyKind::PackageManager => "Spack",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How the settings ask for a dependency to be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedMode {
    Detect,
    Build,
    ErrorAck,
}

/// Lifecycle of one dependency within a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyStatus {
    Unresolved,
    Ready,
    NeedsEdit,
    Failed,
}

/// Outcome of resolving one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyState {
    pub identity: DependencyKind,
    pub requested_mode: Option<RequestedMode>,
    pub location: Option<PathBuf>,
    pub status: DependencyStatus,
    pub error: Option<ErrorRecord>,
}

impl DependencyState {
    /// A fresh, unresolved state.
    pub fn new(identity: DependencyKind) -> Self {
        Self {
            identity,
            requested_mode: None,
            location: None,
            status: DependencyStatus::Unresolved,
            error: None,
        }
    }

    /// Whether the dependency is usable.
    pub fn is_ready(&self) -> bool {
        self.status == DependencyStatus::Ready
    }
}

/// Locate an existing install, `None` meaning auto-detect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectRequest {
    pub path_hint: Option<String>,
}

/// Install into a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub target: String,
}

/// The settings still carry remediation text the user has not acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAckRequest {
    pub message: String,
}

/// The request a settings block expresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionRequest {
    Detect(DetectRequest),
    Build(BuildRequest),
    ErrorAck(ErrorAckRequest),
}

impl ResolutionRequest {
    /// Classify a settings block.
    ///
    /// An `error` marker wins over everything. A missing block, or one
    /// holding the sentinel, asks for auto-detection.
    ///
    /// # Errors
    ///
    /// Returns a message when the block asks to detect and build at once.
    pub fn from_block(
        kind: DependencyKind,
        block: Option<&DependencyBlock>,
    ) -> std::result::Result<Self, String> {
        let Some(block) = block else {
            return Ok(Self::Detect(DetectRequest { path_hint: None }));
        };

        if let Some(message) = &block.error {
            return Ok(Self::ErrorAck(ErrorAckRequest {
                message: message.clone(),
            }));
        }

        match (block.location_hint(), block.build.as_deref()) {
            (Some(_), Some(_)) => Err(format!(
                "{} has both `{}` and `build`; keep only one",
                kind.key(),
                kind.location_key()
            )),
            (None, Some(target)) => Ok(Self::Build(BuildRequest {
                target: target.to_string(),
            })),
            (Some(hint), None) if hint == kind.sentinel() => {
                Ok(Self::Detect(DetectRequest { path_hint: None }))
            }
            (Some(hint), None) => Ok(Self::Detect(DetectRequest {
                path_hint: Some(hint.to_string()),
            })),
            (None, None) => Ok(Self::Detect(DetectRequest { path_hint: None })),
        }
    }

    pub fn mode(&self) -> RequestedMode {
        match self {
            Self::Detect(_) => RequestedMode::Detect,
            Self::Build(_) => RequestedMode::Build,
            Self::ErrorAck(_) => RequestedMode::ErrorAck,
        }
    }
}
