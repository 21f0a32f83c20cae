//! Relinking many pages on a bounded worker pool.
//!
//! Each job is an independent call to [`EntityLinker`]; only jobs run in
//! parallel. Inside one job candidates are still applied one at a time in
//! descending name length.

use std::thread;

use crossbeam_channel::{bounded, unbounded};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BatchConfig;
use crate::error::{ScribeError, ScribeResult};
use crate::link::linker::{EntityLinker, LinkContext, LinkOutcome};
use crate::page::{EntityCandidate, PageId};

/// One page to relink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkJob {
    pub page_id: PageId,
    pub content: String,
    pub context: LinkContext,
}

/// Result of relinking one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinkResult {
    pub page_id: PageId,
    pub outcome: LinkOutcome,
}

/// Runs link jobs across a fixed number of worker threads.
#[derive(Debug, Clone)]
pub struct BatchLinker {
    linker: EntityLinker,
    config: BatchConfig,
}

impl BatchLinker {
    /// Creates a batch linker.
    #[must_use]
    pub const fn new(linker: EntityLinker, config: BatchConfig) -> Self {
        Self { linker, config }
    }

    /// Links every job against `candidates`.
    ///
    /// Each job's own page is excluded from its candidates. Results come
    /// back in job order.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a worker thread cannot be spawned or
    /// disappears before reporting its job.
    pub fn link_all(
        &self,
        jobs: Vec<LinkJob>,
        candidates: &[EntityCandidate],
    ) -> ScribeResult<Vec<PageLinkResult>> {
        let total = jobs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.config.workers.max(1).min(total);
        let queue_capacity = self.config.queue_capacity.max(1);
        let linker = &self.linker;

        let results = thread::scope(|scope| -> ScribeResult<Vec<Option<PageLinkResult>>> {
            let (job_tx, job_rx) = bounded::<(usize, LinkJob)>(queue_capacity);
            let (out_tx, out_rx) = unbounded::<(usize, PageLinkResult)>();

            for idx in 0..workers {
                let rx = job_rx.clone();
                let tx = out_tx.clone();
                thread::Builder::new()
                    .name(format!("scribe-link-{idx}"))
                    .spawn_scoped(scope, move || {
                        for (slot, job) in rx {
                            let ctx = job.context.excluding(job.page_id);
                            let outcome = linker.link_with_report(&job.content, candidates, &ctx);
                            let result = PageLinkResult {
                                page_id: job.page_id,
                                outcome,
                            };
                            if tx.send((slot, result)).is_err() {
                                break;
                            }
                        }
                    })
                    .map_err(|e| ScribeError::internal(format!("failed to spawn link worker: {e}")))?;
            }
            drop(job_rx);
            drop(out_tx);

            for (slot, job) in jobs.into_iter().enumerate() {
                job_tx
                    .send((slot, job))
                    .map_err(|_| ScribeError::internal("link workers disconnected"))?;
            }
            // Close the queue: workers drain it, then exit.
            drop(job_tx);

            let mut slots: Vec<Option<PageLinkResult>> = (0..total).map(|_| None).collect();
            for (slot, result) in out_rx {
                slots[slot] = Some(result);
            }
            Ok(slots)
        })?;

        let results = results
            .into_iter()
            .map(|r| r.ok_or_else(|| ScribeError::internal("link worker dropped a job")))
            .collect::<ScribeResult<Vec<_>>>()?;

        debug!(
            pages = total,
            workers,
            changed = results.iter().filter(|r| r.outcome.changed()).count(),
            "batch relink finished"
        );
        Ok(results)
    }
}
