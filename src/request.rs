//! Generation request payload and its JSON encoding.

use serde::{Deserialize, Serialize};

use crate::error::{ScribeError, ScribeResult, ValidationError};
use crate::merge::{MergeGroup, PreparedEntry};
use crate::page::PageId;
use crate::suggestion::Suggestion;

/// Payload of the generation submission endpoint.
///
/// `entries` is what the endpoint acts on. The reviewed suggestions and
/// the groups they formed ride along so the generated pages can be traced
/// back to the review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub base_page_id: PageId,
    pub entries: Vec<PreparedEntry>,

    #[serde(default)]
    pub suggestions: Vec<Suggestion>,

    #[serde(default)]
    pub groups: Vec<MergeGroup>,
}

impl GenerationRequest {
    /// Creates a request carrying only entries.
    #[must_use]
    pub fn new(base_page_id: PageId, entries: Vec<PreparedEntry>) -> Self {
        Self {
            base_page_id,
            entries,
            suggestions: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Attaches the reviewed suggestions and their groups.
    #[must_use]
    pub fn with_review(mut self, suggestions: Vec<Suggestion>, groups: Vec<MergeGroup>) -> Self {
        self.suggestions = suggestions;
        self.groups = groups;
        self
    }

    /// Checks that the request has something to generate.
    ///
    /// # Errors
    ///
    /// Returns `NothingToSubmit` when `entries` is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.entries.is_empty() {
            return Err(ValidationError::NothingToSubmit);
        }
        Ok(())
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails.
    pub fn to_json(&self) -> ScribeResult<String> {
        serde_json::to_string(self)
            .map_err(|e| ScribeError::internal(format!("serialize request: {e}")))
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails.
    pub fn to_json_pretty(&self) -> ScribeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScribeError::internal(format!("serialize request: {e}")))
    }

    /// Deserialize from JSON.
    ///
    /// Callers should then invoke `validate()` before submitting.
    ///
    /// # Errors
    ///
    /// Returns an internal error if `s` is not a valid request.
    pub fn from_json(s: &str) -> ScribeResult<Self> {
        serde_json::from_str(s).map_err(|e| ScribeError::internal(format!("deserialize request: {e}")))
    }
}
