//! Settings document schema.
//!
//! The settings document (`cc.yaml`) is edited by hand between runs, so the
//! schema is lenient: versions may be YAML integers, `calls` may be a list or
//! a mapping, and unknown top-level keys are carried through untouched.
//! Fractional YAML numbers are refused, since `3.10` would arrive as `3.1`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::deps::DependencyKind;

/// The whole settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory where pulled images are cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<String>,

    /// Desired software and version constraints.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub whitelist: BTreeMap<String, WhitelistEntry>,

    /// Module generation defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_settings: Option<ModuleSettings>,

    /// Container runtime block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singularity: Option<DependencyBlock>,

    /// Module system block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lmod: Option<DependencyBlock>,

    /// Package manager block (only managed when present).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spack: Option<DependencyBlock>,

    /// Shell-init lines staged by dependency managers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileBlock>,

    /// Any other keys the user keeps in the document.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Settings {
    /// The settings block for a dependency.
    pub fn block(&self, kind: DependencyKind) -> Option<&DependencyBlock> {
        match kind {
            DependencyKind::ContainerRuntime => self.singularity.as_ref(),
            DependencyKind::ModuleSystem => self.lmod.as_ref(),
            DependencyKind::PackageManager => self.spack.as_ref(),
        }
    }

    /// Mutable slot for a dependency's settings block.
    pub fn block_slot(&mut self, kind: DependencyKind) -> &mut Option<DependencyBlock> {
        match kind {
            DependencyKind::ContainerRuntime => &mut self.singularity,
            DependencyKind::ModuleSystem => &mut self.lmod,
            DependencyKind::PackageManager => &mut self.spack,
        }
    }

    /// The default image source for whitelist entries without one.
    pub fn default_source(&self) -> Source {
        self.module_settings
            .as_ref()
            .and_then(|m| m.source)
            .unwrap_or_default()
    }

    /// Whether suffixed tags are skipped when matching ranges.
    pub fn prefer_no_suffix(&self) -> bool {
        self.module_settings
            .as_ref()
            .and_then(|m| m.prefer_no_suffix)
            .unwrap_or(true)
    }

    /// Staged shell-init lines, creating the block if needed.
    pub fn profile_mut(&mut self) -> &mut ProfileBlock {
        self.profile.get_or_insert_with(ProfileBlock::default)
    }
}

/// Per-dependency block: `path`/`root` to detect, `build` to install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,

    /// Where generated modulefiles live (module system only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulefiles: Option<String>,

    /// Remediation text left for the user. Its presence blocks resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyBlock {
    /// The `path` or `root` value, whichever is set.
    pub fn location_hint(&self) -> Option<&str> {
        self.path.as_deref().or(self.root.as_deref())
    }
}

/// Module generation defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    /// Reject suffixed tags (`3.6-wheezy`) unless requested literally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_no_suffix: Option<bool>,
}

/// Where container images are pulled from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Docker Hub (`docker://`).
    #[default]
    Docker,
    /// Sylabs cloud library (`library://`).
    Library,
    /// Singularity Hub (`shub://`).
    #[serde(rename = "shub")]
    Hub,
}

impl Source {
    /// URI scheme used by `singularity pull`.
    pub fn scheme(&self) -> &'static str {
        match self {
            Source::Docker => "docker",
            Source::Library => "library",
            Source::Hub => "shub",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// One whitelist entry: a bare version or a detail mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WhitelistEntry {
    Version(String),
    Detail(WhitelistDetail),
}

impl WhitelistEntry {
    /// Attach an error note, turning a bare version into a detail entry.
    pub fn mark_error(&mut self, message: &str) {
        if let WhitelistEntry::Version(version) = self {
            *self = WhitelistEntry::Detail(WhitelistDetail {
                version: Some(std::mem::take(version)),
                ..Default::default()
            });
        }
        if let WhitelistEntry::Detail(detail) = self {
            detail.error = Some(message.to_string());
        }
    }

    /// Drop any error note left by an earlier refresh.
    pub fn clear_error(&mut self) {
        if let WhitelistEntry::Detail(detail) = self {
            detail.error = None;
        }
    }
}

impl<'de> Deserialize<'de> for WhitelistEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_yaml::Value::deserialize(deserializer)? {
            value @ serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value)
                .map(WhitelistEntry::Detail)
                .map_err(D::Error::custom),
            value => value_to_version(value)
                .map(WhitelistEntry::Version)
                .map_err(D::Error::custom),
        }
    }
}

/// Detailed whitelist entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhitelistDetail {
    #[serde(
        default,
        deserialize_with = "opt_version_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    /// Repository override, e.g. `nvidia/cuda`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls: Option<Calls>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub gpu: bool,

    /// Set when the last refresh could not satisfy this entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Shell aliases exposed by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Calls {
    /// Each alias runs the command of the same name inside the image.
    List(Vec<String>),
    /// Alias to command; a null command means `singularity run`.
    Map(BTreeMap<String, Option<String>>),
}

/// Shell-init lines keyed by the dependency that staged them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileBlock {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mods: BTreeMap<String, Vec<String>>,
}

impl ProfileBlock {
    /// All staged lines in key order, without duplicates.
    pub fn lines(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for line in self.mods.values().flatten() {
            if !out.contains(line) {
                out.push(line.clone());
            }
        }
        out
    }
}

fn value_to_version(value: serde_yaml::Value) -> Result<String, String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) if n.is_f64() => Err(format!(
            "version {} was written as a YAML number, which drops trailing zeros; quote it as a string",
            n
        )),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok(crate::version::VERSIONLESS.to_string()),
        _ => Err("expected a version string or integer".to_string()),
    }
}

fn opt_version_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(v) => value_to_version(v).map(Some).map_err(D::Error::custom),
    }
}
