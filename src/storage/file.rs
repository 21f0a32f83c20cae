//! Job documents read from a directory of JSON files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::job::{JobDocument, JobId};
use crate::storage::traits::{StorageError, SuggestionSource};

/// Reads `{dir}/{job_id}.json`.
#[derive(Debug, Clone)]
pub struct JobFileSource {
    dir: PathBuf,
}

impl JobFileSource {
    /// Creates a source rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the job files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, job_id: &JobId) -> Result<PathBuf, StorageError> {
        let id = job_id.as_str();
        if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(StorageError::BackendError(format!("invalid job id: {id:?}")));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

impl SuggestionSource for JobFileSource {
    fn load_job(&self, job_id: &JobId) -> Result<JobDocument, StorageError> {
        let path = self.path_for(job_id)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::JobNotFound(job_id.to_string()));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };
        let doc: JobDocument = serde_json::from_str(&raw)
            .map_err(|e| StorageError::SerializationError(format!("{}: {e}", path.display())))?;
        debug!(job = %job_id, status = %doc.status, suggestions = doc.suggestions.len(), "loaded job file");
        Ok(doc)
    }
}
