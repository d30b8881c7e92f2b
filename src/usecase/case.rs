//! The resolved locations a module generation pass works from.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where every dependency ended up, recorded once all are ready.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Container runtime install prefix.
    pub singularity: PathBuf,
    /// Module system root.
    pub lmod: PathBuf,
    /// Generated modulefiles root.
    pub modulefiles: PathBuf,
    /// Package manager root, when managed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spack: Option<PathBuf>,
}
