//! Error types for the data layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::entity::EntityKind;

/// A create or update was rejected before any store was touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields: {} ({kind})", .missing.join(", "))]
    MissingFields {
        kind: EntityKind,
        missing: Vec<&'static str>,
    },

    #[error("An identifier is required to modify a {}", .0.singular())]
    MissingId(EntityKind),
}

/// Failure talking to the remote store.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Invalid remote endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Remote store returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response from remote store: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else {
            RemoteError::Http(e.to_string())
        }
    }
}

/// Failure reading or writing the local fallback store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error for {}: {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("Corrupted local data under '{0}': {1}")]
    Parse(String, #[source] serde_json::Error),
}

/// Errors surfaced by [`crate::sync::SyncLayer`] write operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to reach the remote store, please try again. ({0})")]
    Remote(#[from] RemoteError),

    #[error("Failed to save locally: {0}")]
    Store(#[from] StoreError),

    #[error("No {} with id '{id}'", .kind.singular())]
    NotFound { kind: EntityKind, id: String },

    #[error("Failed to encode {kind} record: {source}")]
    Encode {
        kind: EntityKind,
        #[source]
        source: serde_json::Error,
    },
}

impl SyncError {
    /// Remote failures leave every store untouched, so the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = ValidationError::MissingFields {
            kind: EntityKind::Patients,
            missing: vec!["name", "age"],
        };
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields: name, age (patients)"
        );
    }

    #[test]
    fn test_missing_id_message() {
        let err = ValidationError::MissingId(EntityKind::TestReports);
        assert_eq!(
            err.to_string(),
            "An identifier is required to modify a test report"
        );
    }

    #[test]
    fn test_only_remote_errors_are_retryable() {
        let remote = SyncError::from(RemoteError::Status {
            status: 503,
            message: "unavailable".into(),
        });
        assert!(remote.is_retryable());

        let validation = SyncError::from(ValidationError::MissingId(EntityKind::Doctors));
        assert!(!validation.is_retryable());

        let not_found = SyncError::NotFound {
            kind: EntityKind::Doctors,
            id: "D999".into(),
        };
        assert!(!not_found.is_retryable());
        assert_eq!(not_found.to_string(), "No doctor with id 'D999'");
    }
}
