//! Errors collected during one run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A registered error: a short message and, for failures, the full chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ErrorRecord {
    /// A configuration error with no trace.
    pub fn needs_edit(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: None,
        }
    }

    /// A failure captured from an error chain.
    pub fn from_failure(err: &anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            trace: Some(format!("{:?}", err)),
        }
    }
}

/// Errors keyed by dependency or operation name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorRegistry {
    entries: BTreeMap<String, ErrorRecord>,
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an error, replacing any earlier one under the same key.
    pub fn register(&mut self, key: impl Into<String>, record: ErrorRecord) {
        let key = key.into();
        tracing::debug!("registered error for {}: {}", key, record.message);
        self.entries.insert(key, record);
    }

    /// Drop the error for `key`.
    pub fn clear(&mut self, key: &str) -> Option<ErrorRecord> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ErrorRecord> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ErrorRecord)> {
        self.entries.iter()
    }
}
