//! In-memory storage backends.
//!
//! Thread-safe implementations of the storage traits, intended for embedded
//! usage and tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use crate::error::TransportError;
use crate::job::{JobDocument, JobId, JobReceipt};
use crate::page::{EntityCandidate, PageId, WorldId};
use crate::request::GenerationRequest;
use crate::storage::traits::{GenerationSink, PageDirectory, StorageError, SuggestionSource};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// Job documents keyed by id.
#[derive(Debug, Default)]
pub struct InMemorySuggestionSource {
    jobs: RwLock<HashMap<JobId, JobDocument>>,
}

impl InMemorySuggestionSource {
    /// Create a new empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces the document of `job_id`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the lock is poisoned.
    pub fn put(&self, job_id: JobId, doc: JobDocument) -> Result<(), StorageError> {
        self.jobs
            .write()
            .map_err(|_| lock_err("suggestions.put"))?
            .insert(job_id, doc);
        Ok(())
    }
}

impl SuggestionSource for InMemorySuggestionSource {
    fn load_job(&self, job_id: &JobId) -> Result<JobDocument, StorageError> {
        let jobs = self.jobs.read().map_err(|_| lock_err("suggestions.load_job"))?;
        jobs.get(job_id)
            .cloned()
            .ok_or_else(|| StorageError::JobNotFound(job_id.to_string()))
    }
}

/// Page directory backed by a list of candidates.
#[derive(Debug, Default)]
pub struct InMemoryPageDirectory {
    pages: RwLock<Vec<EntityCandidate>>,
}

impl InMemoryPageDirectory {
    /// Create a new empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding `pages`.
    #[must_use]
    pub fn with_pages(pages: Vec<EntityCandidate>) -> Self {
        Self {
            pages: RwLock::new(pages),
        }
    }

    /// Adds a page, replacing any page with the same id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the lock is poisoned.
    pub fn upsert(&self, page: EntityCandidate) -> Result<(), StorageError> {
        let mut pages = self.pages.write().map_err(|_| lock_err("pages.upsert"))?;
        match pages.iter().position(|p| p.id == page.id) {
            Some(idx) => pages[idx] = page,
            None => pages.push(page),
        }
        Ok(())
    }

    /// Removes a page. Returns true if it was present.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the lock is poisoned.
    pub fn remove(&self, id: PageId) -> Result<bool, StorageError> {
        let mut pages = self.pages.write().map_err(|_| lock_err("pages.remove"))?;
        let before = pages.len();
        pages.retain(|p| p.id != id);
        Ok(pages.len() != before)
    }
}

impl PageDirectory for InMemoryPageDirectory {
    fn candidates_for(
        &self,
        world: WorldId,
        allow_cross_world: bool,
    ) -> Result<Vec<EntityCandidate>, StorageError> {
        let pages = self.pages.read().map_err(|_| lock_err("pages.candidates_for"))?;
        Ok(pages
            .iter()
            .filter(|p| allow_cross_world || p.gameworld_id == world)
            .cloned()
            .collect())
    }

    fn all_candidates(&self) -> Result<Vec<EntityCandidate>, StorageError> {
        let pages = self.pages.read().map_err(|_| lock_err("pages.all_candidates"))?;
        Ok(pages.clone())
    }
}

#[derive(Debug, Default)]
struct SinkState {
    submitted: Vec<GenerationRequest>,
    failures: VecDeque<TransportError>,
}

/// Generation sink that records requests instead of sending them.
///
/// Queued failures are returned by the next submissions, one each, before
/// recording resumes.
#[derive(Debug, Default)]
pub struct InMemoryGenerationSink {
    state: Mutex<SinkState>,
}

impl InMemoryGenerationSink {
    /// Create a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next submission fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the lock is poisoned.
    pub fn fail_next(&self, error: TransportError) -> Result<(), StorageError> {
        self.state
            .lock()
            .map_err(|_| lock_err("sink.fail_next"))?
            .failures
            .push_back(error);
        Ok(())
    }

    /// Requests accepted so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<GenerationRequest> {
        self.state
            .lock()
            .map(|s| s.submitted.clone())
            .unwrap_or_default()
    }
}

impl GenerationSink for InMemoryGenerationSink {
    fn submit(&self, request: &GenerationRequest) -> Result<JobReceipt, TransportError> {
        let mut state = self.state.lock().map_err(|_| TransportError::ConnectionFailed {
            message: "poisoned lock: sink.submit".to_string(),
        })?;
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        state.submitted.push(request.clone());
        Ok(JobReceipt::now(JobId::new()))
    }
}
