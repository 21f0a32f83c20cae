//! Error types for scribe.
//!
//! Errors are strongly typed using thiserror so callers can pattern match
//! on specific conditions. The merge engine and the auto-linker never fail;
//! errors only arise at the seams (job loading, submission, configuration).

use thiserror::Error;

use crate::job::{JobId, JobStatus};
use crate::storage::StorageError;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Base page id is required for a generation request")]
    EmptyBasePage,

    #[error("Nothing to submit: reconciliation produced no entries")]
    NothingToSubmit,

    #[error("Job {job_id} is not ready for review (status: {status})")]
    JobNotReady {
        job_id: JobId,
        status: JobStatus,
    },

    #[error("Unknown suggestion: '{name}'")]
    UnknownSuggestion {
        name: String,
    },

    #[error("Suggestion name cannot be empty")]
    EmptySuggestionName,

    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },
}

/// Transport errors for the generation submission endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        message: String,
    },

    #[error("Failed to serialize request: {message}")]
    SerializationFailed {
        message: String,
    },

    #[error("Failed to deserialize response: {message}")]
    DeserializationFailed {
        message: String,
    },

    #[error("Server error (code {code}): {message}")]
    ServerError {
        code: u32,
        message: String,
    },
}

/// Top-level error type for scribe.
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl ScribeError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if the failed call may succeed when repeated.
    ///
    /// Submissions are never retried internally; this only informs the
    /// caller whether recomputing and resubmitting is worthwhile.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Internal { .. } => false,
            Self::Transport(e) => match e {
                TransportError::ConnectionFailed { .. } => true,
                TransportError::ServerError { code, .. } => *code >= 500,
                _ => false,
            },
            Self::Storage(e) => matches!(e, StorageError::Io(_)),
        }
    }
}

/// Result type alias for scribe operations.
pub type ScribeResult<T> = Result<T, ScribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_not_ready() {
        let err = ValidationError::JobNotReady {
            job_id: JobId::from("job-1"),
            status: JobStatus::Processing,
        };
        let msg = format!("{err}");
        assert!(msg.contains("job-1"));
        assert!(msg.contains("processing"));
    }

    #[test]
    fn test_validation_error_invalid_config() {
        let err = ValidationError::InvalidConfig {
            field: "linker.link_class".to_string(),
            reason: "must not be empty".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("linker.link_class"));
        assert!(msg.contains("must not be empty"));
    }

    #[test]
    fn test_transport_error() {
        let err = TransportError::ConnectionFailed {
            message: "refused".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Connection failed"));
        assert!(msg.contains("refused"));
    }

    #[test]
    fn test_scribe_error_from_validation() {
        let err: ScribeError = ValidationError::NothingToSubmit.into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_scribe_error_from_storage() {
        let err: ScribeError = StorageError::JobNotFound("abc".to_string()).into();
        assert!(err.is_storage());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_scribe_error_internal() {
        let err = ScribeError::internal("unexpected state");
        assert!(err.is_internal());
        assert!(!err.is_retryable());
        assert!(format!("{err}").contains("unexpected state"));
    }

    #[test]
    fn test_scribe_error_retryable() {
        let err1: ScribeError = TransportError::ConnectionFailed {
            message: "reset".to_string(),
        }
        .into();
        assert!(err1.is_transport());
        assert!(err1.is_retryable());

        let err2: ScribeError = TransportError::ServerError {
            code: 503,
            message: "unavailable".to_string(),
        }
        .into();
        assert!(err2.is_retryable());

        // Client errors won't change on retry
        let err3: ScribeError = TransportError::ServerError {
            code: 422,
            message: "bad payload".to_string(),
        }
        .into();
        assert!(!err3.is_retryable());
    }
}
