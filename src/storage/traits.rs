//! Storage seams for scribe.
//!
//! The merge engine and the linker are pure; everything they read or
//! produce crosses one of these traits:
//! - [`SuggestionSource`] loads finished analysis jobs
//! - [`PageDirectory`] lists the pages that may be linked
//! - [`GenerationSink`] accepts reconciled generation requests

use thiserror::Error;

use crate::error::TransportError;
use crate::job::{JobDocument, JobId, JobReceipt};
use crate::page::{EntityCandidate, WorldId};
use crate::request::GenerationRequest;

/// Errors that can occur while reading stored state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No job document for the id.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Stored data could not be decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of analysis job documents.
pub trait SuggestionSource: Send + Sync {
    /// Loads the document of `job_id`, whatever its status.
    fn load_job(&self, job_id: &JobId) -> Result<JobDocument, StorageError>;
}

/// Directory of existing pages that content may link to.
pub trait PageDirectory: Send + Sync {
    /// Candidates visible from `world`.
    ///
    /// With `allow_cross_world` set, pages of every world are returned.
    fn candidates_for(
        &self,
        world: WorldId,
        allow_cross_world: bool,
    ) -> Result<Vec<EntityCandidate>, StorageError>;

    /// Every known page.
    fn all_candidates(&self) -> Result<Vec<EntityCandidate>, StorageError>;
}

/// Destination of generation requests.
///
/// Implementations submit once. Callers decide whether to retry.
pub trait GenerationSink: Send + Sync {
    /// Submits `request` and returns the receipt of the started job.
    fn submit(&self, request: &GenerationRequest) -> Result<JobReceipt, TransportError>;
}
