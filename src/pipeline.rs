//! Review sessions and the reconcile, submit and render pipeline.
//!
//! A [`ReviewSession`] holds the suggestions of one finished analysis job
//! while a user selects and merges them. Every reconciliation is recomputed
//! from the session's current state, so a failed submission can simply be
//! retried.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ScribeConfig;
use crate::error::{ScribeResult, ValidationError};
use crate::job::{JobDocument, JobId, JobReceipt};
use crate::link::{unlink_page, BatchLinker, EntityLinker, LinkContext, LinkJob, PageLinkResult};
use crate::merge::{cluster, reconcile, MergeGroup, PreparedEntry, Reconciliation};
use crate::page::{EntityCandidate, PageId, WorldId};
use crate::request::GenerationRequest;
use crate::storage::{GenerationSink, PageDirectory, SuggestionSource};
use crate::suggestion::Suggestion;

/// Suggestions of one job under review.
///
/// With nothing selected every suggestion is active; otherwise only the
/// selected ones are. Merge targets that point at inactive names dangle and
/// are dropped during resolution.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    job_id: JobId,
    base_page: Option<PageId>,
    suggestions: Vec<Suggestion>,
    selected: HashSet<String>,
}

impl ReviewSession {
    /// Starts a session over the suggestions of `doc`.
    #[must_use]
    pub fn new(job_id: JobId, doc: JobDocument) -> Self {
        Self {
            job_id,
            base_page: doc.page_id,
            suggestions: doc.suggestions,
            selected: HashSet::new(),
        }
    }

    /// Job the suggestions came from.
    #[must_use]
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Page the analysis started from, if the job recorded it.
    #[must_use]
    pub fn base_page(&self) -> Option<PageId> {
        self.base_page
    }

    /// All suggestions, in job order.
    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Looks up a suggestion by name.
    #[must_use]
    pub fn suggestion(&self, name: &str) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.name == name)
    }

    fn position(&self, name: &str) -> Result<usize, ValidationError> {
        self.suggestions
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ValidationError::UnknownSuggestion {
                name: name.to_string(),
            })
    }

    /// Adds `name` to the selection.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSuggestion` if no suggestion has that name.
    pub fn select(&mut self, name: &str) -> Result<(), ValidationError> {
        self.position(name)?;
        self.selected.insert(name.to_string());
        Ok(())
    }

    /// Removes `name` from the selection.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSuggestion` if no suggestion has that name.
    pub fn deselect(&mut self, name: &str) -> Result<(), ValidationError> {
        self.position(name)?;
        self.selected.remove(name);
        Ok(())
    }

    /// Selects every suggestion.
    pub fn select_all(&mut self) {
        self.selected = self.suggestions.iter().map(|s| s.name.clone()).collect();
    }

    /// Clears the selection, making every suggestion active again.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Returns true if `name` is explicitly selected.
    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Number of explicitly selected suggestions.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Declares that `name` and `target` describe the same entity.
    ///
    /// `target` need not exist. Returns false if it was already declared.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSuggestion` if `name` is not in the session.
    pub fn add_merge_target(&mut self, name: &str, target: &str) -> Result<bool, ValidationError> {
        let idx = self.position(name)?;
        Ok(self.suggestions[idx].add_merge_target(target))
    }

    /// Withdraws a merge declaration. Returns true if it was present.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSuggestion` if `name` is not in the session.
    pub fn remove_merge_target(&mut self, name: &str, target: &str) -> Result<bool, ValidationError> {
        let idx = self.position(name)?;
        Ok(self.suggestions[idx].remove_merge_target(target))
    }

    /// Flags suggestions that describe an existing page and switches them
    /// to update mode; the rest go back to create mode.
    ///
    /// Returns the number of suggestions found to exist.
    pub fn mark_existing(&mut self, pages: &[EntityCandidate]) -> usize {
        let mut found = 0;
        for suggestion in &mut self.suggestions {
            let exists = pages.iter().any(|p| suggestion.describes(p));
            suggestion.set_exists(exists);
            if exists {
                found += 1;
            }
        }
        found
    }

    /// Suggestions that take part in reconciliation, in job order.
    #[must_use]
    pub fn active_suggestions(&self) -> Vec<Suggestion> {
        if self.selected.is_empty() {
            return self.suggestions.clone();
        }
        self.suggestions
            .iter()
            .filter(|s| self.selected.contains(&s.name))
            .cloned()
            .collect()
    }

    /// Runs a full reconciliation pass over the active suggestions.
    #[must_use]
    pub fn reconcile(&self) -> Reconciliation {
        reconcile(&self.active_suggestions())
    }

    /// Merge groups of the active suggestions.
    #[must_use]
    pub fn groups(&self) -> Vec<MergeGroup> {
        cluster(&self.active_suggestions())
    }

    /// One prepared entry per merge group of the active suggestions.
    #[must_use]
    pub fn prepared_entries(&self) -> Vec<PreparedEntry> {
        self.reconcile().entries().cloned().collect()
    }
}

/// Wires the merge engine and the linker to their storage seams.
pub struct Pipeline {
    config: ScribeConfig,
    jobs: Arc<dyn SuggestionSource>,
    directory: Arc<dyn PageDirectory>,
    sink: Arc<dyn GenerationSink>,
    linker: EntityLinker,
}

impl Pipeline {
    /// Creates a pipeline.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `config` is out of range.
    pub fn new(
        config: ScribeConfig,
        jobs: Arc<dyn SuggestionSource>,
        directory: Arc<dyn PageDirectory>,
        sink: Arc<dyn GenerationSink>,
    ) -> ScribeResult<Self> {
        let config = config.validate()?;
        let linker = EntityLinker::new(config.linker.clone());
        Ok(Self {
            config,
            jobs,
            directory,
            sink,
            linker,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ScribeConfig {
        &self.config
    }

    /// Linker built from the configuration.
    #[must_use]
    pub fn linker(&self) -> &EntityLinker {
        &self.linker
    }

    /// Loads a finished job and starts reviewing it.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the job cannot be loaded and `JobNotReady`
    /// if it is still processing or failed.
    pub fn open_session(&self, job_id: &JobId) -> ScribeResult<ReviewSession> {
        let doc = self.jobs.load_job(job_id)?;
        if !doc.status.is_done() {
            return Err(ValidationError::JobNotReady {
                job_id: job_id.clone(),
                status: doc.status,
            }
            .into());
        }
        info!(job = %job_id, suggestions = doc.suggestions.len(), "opened review session");
        Ok(ReviewSession::new(job_id.clone(), doc))
    }

    /// Re-checks which suggestions already exist as pages of `world`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the page directory cannot be read.
    pub fn refresh_existing(&self, session: &mut ReviewSession, world: WorldId) -> ScribeResult<usize> {
        let pages = self.directory.candidates_for(world, false)?;
        let found = session.mark_existing(&pages);
        debug!(job = %session.job_id(), existing = found, "refreshed existing pages");
        Ok(found)
    }

    /// Builds the generation request for the session's current state.
    ///
    /// `base_page` falls back to the page recorded on the job.
    ///
    /// # Errors
    ///
    /// Returns `EmptyBasePage` if no base page is known.
    pub fn prepare(
        &self,
        session: &ReviewSession,
        base_page: Option<PageId>,
    ) -> ScribeResult<GenerationRequest> {
        let base = base_page
            .or_else(|| session.base_page())
            .ok_or(ValidationError::EmptyBasePage)?;

        let active = session.active_suggestions();
        let reconciliation = reconcile(&active);
        let entries: Vec<PreparedEntry> = reconciliation.entries().cloned().collect();
        debug!(
            job = %session.job_id(),
            active = active.len(),
            entries = entries.len(),
            ambiguous = reconciliation.has_ambiguous_concepts(),
            "prepared generation request"
        );
        Ok(GenerationRequest::new(base, entries).with_review(active, reconciliation.groups))
    }

    /// Sends `request` to the generation endpoint once.
    ///
    /// # Errors
    ///
    /// Returns `NothingToSubmit` for an empty request, without contacting
    /// the endpoint, and the transport error of a failed submission.
    pub fn submit(&self, request: &GenerationRequest) -> ScribeResult<JobReceipt> {
        request.validate()?;
        let receipt = self.sink.submit(request)?;
        info!(
            job = %receipt.job_id,
            base_page = %request.base_page_id,
            entries = request.entries.len(),
            "submitted generation request"
        );
        Ok(receipt)
    }

    /// Prepares and submits in one step.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::prepare`] and [`Pipeline::submit`].
    pub fn prepare_and_submit(
        &self,
        session: &ReviewSession,
        base_page: Option<PageId>,
    ) -> ScribeResult<JobReceipt> {
        let request = self.prepare(session, base_page)?;
        self.submit(&request)
    }

    /// Links `content` against the pages visible from `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the page directory cannot be read.
    pub fn render(&self, content: &str, ctx: &LinkContext) -> ScribeResult<String> {
        let candidates = self.directory.candidates_for(ctx.world, ctx.allow_cross_world)?;
        Ok(self.linker.link(content, &candidates, ctx))
    }

    /// Relinks many pages on the configured worker pool.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the page directory cannot be read and an
    /// internal error if the worker pool fails.
    pub fn relink_pages(&self, jobs: Vec<LinkJob>) -> ScribeResult<Vec<PageLinkResult>> {
        let candidates = self.directory.all_candidates()?;
        BatchLinker::new(self.linker.clone(), self.config.batch.clone()).link_all(jobs, &candidates)
    }

    /// Strips links to a removed page from `content`.
    #[must_use]
    pub fn unlink(&self, content: &str, page: PageId) -> (String, usize) {
        unlink_page(content, page, &self.config.linker.route_prefix)
    }
}
