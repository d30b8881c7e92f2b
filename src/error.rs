//! Error types for comcol operations.
//!
//! This module defines [`ComcolError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `ComcolError` for conditions the caller needs to tell apart
//! - Use `anyhow::Error` inside install plans and the registry client, then
//!   convert at the dependency manager boundary into an error record
//! - `UserEditRequired` is a terminal condition, not a crash: it is printed
//!   without a cause chain

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for comcol operations.
#[derive(Debug, Error)]
pub enum ComcolError {
    /// Settings document not found at expected location.
    #[error("Settings not found: {path}")]
    SettingsNotFound { path: PathBuf },

    /// Failed to parse the settings document.
    #[error("Failed to parse settings at {path}: {message}")]
    SettingsParseError { path: PathBuf, message: String },

    /// Invalid settings structure or values.
    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Installing a dependency failed.
    #[error("Building {dependency} failed: {message}")]
    BuildFailed { dependency: String, message: String },

    /// No available tag satisfies the requested version.
    #[error("No version of '{name}' satisfies '{constraint}' in {repo}")]
    UnsatisfiedVersion {
        name: String,
        constraint: String,
        repo: String,
    },

    /// The container registry could not be queried.
    #[error("Registry query failed for {repo}: {message}")]
    RegistryError { repo: String, message: String },

    /// Resolution stopped and the user must edit the settings document.
    #[error("Caught errors. Edit {} to continue.", path.display())]
    UserEditRequired { path: PathBuf },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComcolError {
    /// Whether the error should be shown without a cause chain.
    pub fn is_user_edit(&self) -> bool {
        matches!(self, ComcolError::UserEditRequired { .. })
    }
}

/// Result type alias for comcol operations.
pub type Result<T> = std::result::Result<T, ComcolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_not_found_displays_path() {
        let err = ComcolError::SettingsNotFound {
            path: PathBuf::from("/work/cc.yaml"),
        };
        assert!(err.to_string().contains("/work/cc.yaml"));
    }

    #[test]
    fn settings_parse_error_displays_path_and_message() {
        let err = ComcolError::SettingsParseError {
            path: PathBuf::from("/cc.yaml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/cc.yaml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = ComcolError::CommandFailed {
            command: "make install".into(),
            code: Some(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("make install"));
        assert!(msg.contains('2'));
    }

    #[test]
    fn unsatisfied_version_names_constraint_and_repo() {
        let err = ComcolError::UnsatisfiedVersion {
            name: "python".into(),
            constraint: ">=9.0".into(),
            repo: "docker://python".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(">=9.0"));
        assert!(msg.contains("docker://python"));
    }

    #[test]
    fn user_edit_required_names_settings_file() {
        let err = ComcolError::UserEditRequired {
            path: PathBuf::from("cc.yaml"),
        };
        assert_eq!(err.to_string(), "Caught errors. Edit cc.yaml to continue.");
        assert!(err.is_user_edit());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ComcolError = io_err.into();
        assert!(matches!(err, ComcolError::Io(_)));
        assert!(!err.is_user_edit());
    }
}
