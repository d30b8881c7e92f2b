//! Whitelist entries turned into module requests.

use crate::config::{Calls, Settings, Source, WhitelistEntry};
use crate::version::{VersionConstraint, VERSIONLESS};

/// One desired piece of software.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    /// Module name (the whitelist key).
    pub name: String,
    /// Version text as written, `versionless` when absent.
    pub requested_version: String,
    pub source: Source,
    /// Repository on the source, e.g. `nvidia/cuda`. Defaults to the name.
    pub repo: String,
    pub calls: Option<Calls>,
    pub gpu: bool,
}

impl ModuleRequest {
    /// Build a request from one whitelist entry.
    pub fn from_entry(name: &str, entry: &WhitelistEntry, default_source: Source) -> Self {
        match entry {
            WhitelistEntry::Version(version) => Self {
                name: name.to_string(),
                requested_version: version.clone(),
                source: default_source,
                repo: name.to_string(),
                calls: None,
                gpu: false,
            },
            WhitelistEntry::Detail(detail) => Self {
                name: name.to_string(),
                requested_version: detail
                    .version
                    .clone()
                    .unwrap_or_else(|| VERSIONLESS.to_string()),
                source: detail.source.unwrap_or(default_source),
                repo: detail.repo.clone().unwrap_or_else(|| name.to_string()),
                calls: detail.calls.clone(),
                gpu: detail.gpu,
            },
        }
    }

    /// Every whitelist entry in name order.
    pub fn all_from(settings: &Settings) -> Vec<Self> {
        let source = settings.default_source();
        settings
            .whitelist
            .iter()
            .map(|(name, entry)| Self::from_entry(name, entry, source))
            .collect()
    }

    /// The parsed version constraint.
    pub fn constraint(&self) -> VersionConstraint {
        VersionConstraint::parse(&self.requested_version)
    }

    /// Image URI without the tag, e.g. `docker://nvidia/cuda:`.
    pub fn source_prefix(&self) -> String {
        format!("{}://{}:", self.source.scheme(), self.repo)
    }
}
