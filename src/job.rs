//! Analysis and generation job records.
//!
//! Jobs run in an external worker. This crate only reads the documents they
//! leave behind and the receipts the generation endpoint hands back.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::page::PageId;
use crate::suggestion::Suggestion;

/// Identifier of an external job.
///
/// Job ids are opaque strings issued by the job service; new ids are
/// random UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Creates a new random job ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Lifecycle state of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Still running.
    Processing,
    /// Finished; suggestions are available.
    #[serde(alias = "finished")]
    Done,
    /// Failed; see the document's `error`.
    Error,
}

impl JobStatus {
    /// Returns true if the job's suggestions can be reviewed.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Document left behind by an analysis job.
///
/// # Examples
///
/// ```
/// use scribe::{JobDocument, JobStatus};
///
/// let doc: JobDocument = serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
/// assert_eq!(doc.status, JobStatus::Processing);
/// assert!(doc.suggestions.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDocument {
    pub status: JobStatus,

    #[serde(default)]
    pub suggestions: Vec<Suggestion>,

    /// Page the analysis started from; used as the default base page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<PageId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobDocument {
    /// Creates a finished job document.
    #[must_use]
    pub fn done(suggestions: Vec<Suggestion>) -> Self {
        Self {
            status: JobStatus::Done,
            suggestions,
            page_id: None,
            error: None,
        }
    }

    /// Sets the base page.
    #[must_use]
    pub fn with_page(mut self, page_id: PageId) -> Self {
        self.page_id = Some(page_id);
        self
    }
}

/// Reference returned by the generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReceipt {
    pub job_id: JobId,
    pub submitted_at: DateTime<Utc>,
}

impl JobReceipt {
    /// Creates a receipt stamped with the current time.
    #[must_use]
    pub fn now(job_id: JobId) -> Self {
        Self {
            job_id,
            submitted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
        assert_eq!(JobId::from("abc").as_str(), "abc");
    }

    #[test]
    fn test_finished_is_accepted_as_done() {
        let doc: JobDocument =
            serde_json::from_str(r#"{"status": "finished", "suggestions": []}"#).unwrap();
        assert!(doc.status.is_done());
    }

    #[test]
    fn test_error_document() {
        let doc: JobDocument =
            serde_json::from_str(r#"{"status": "error", "error": "Agent not found"}"#).unwrap();
        assert_eq!(doc.status, JobStatus::Error);
        assert_eq!(doc.error.as_deref(), Some("Agent not found"));
        assert!(!doc.status.is_done());
    }

    #[test]
    fn test_receipt_roundtrips_through_json() {
        let receipt = JobReceipt::now(JobId::from("gen-1"));
        let json = serde_json::to_string(&receipt).unwrap();
        let back: JobReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, receipt);
    }
}
