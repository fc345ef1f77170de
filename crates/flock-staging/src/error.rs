//! Error types for the staging queue.

use crate::file::Status;
use thiserror::Error;

/// Errors returned for invalid caller-driven transitions.
///
/// Transport events on removed or finished files are not errors; they come
/// back as [`EventOutcome::Ignored`](crate::queue::EventOutcome::Ignored).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StagingError {
    /// No staged file has this id.
    #[error("unknown staged file: {0}")]
    UnknownFile(String),

    /// The file is not in a state that allows the action.
    #[error("cannot {action} {id}: file is {status}")]
    InvalidTransition {
        id: String,
        action: &'static str,
        status: Status,
    },

    /// The file carries a validation error and cannot start uploading.
    #[error("cannot upload {id}: {reason}")]
    Invalid { id: String, reason: String },
}

impl StagingError {
    /// Returns the id of the file the error is about.
    pub fn file_id(&self) -> &str {
        match self {
            Self::UnknownFile(id) | Self::InvalidTransition { id, .. } | Self::Invalid { id, .. } => id,
        }
    }
}

/// A specialized [`Result`] for staging operations.
pub type Result<T> = std::result::Result<T, StagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StagingError::InvalidTransition {
            id: "staged-3".into(),
            action: "start",
            status: Status::Success,
        };
        assert_eq!(err.to_string(), "cannot start staged-3: file is success");
        assert_eq!(err.file_id(), "staged-3");
    }

    #[test]
    fn test_unknown_file() {
        let err = StagingError::UnknownFile("staged-0".into());
        assert_eq!(err.to_string(), "unknown staged file: staged-0");
    }
}
