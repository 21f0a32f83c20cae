//! Suggestion reconciliation.
//!
//! [`NameGraph`] clusters suggestion names into merge groups and
//! [`MergeResolver`] collapses each group into one [`PreparedEntry`]. Both are
//! pure functions of the current suggestion list; nothing is cached between
//! passes.

pub mod graph;
pub mod resolver;

pub use graph::{cluster, GroupKey, MergeGroup, NameGraph};
pub use resolver::{MergeResolver, PreparedEntry, Resolution};

use crate::suggestion::Suggestion;

/// Output of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub groups: Vec<MergeGroup>,
    pub resolutions: Vec<Resolution>,
}

impl Reconciliation {
    /// Prepared entries, one per non-empty group.
    pub fn entries(&self) -> impl Iterator<Item = &PreparedEntry> {
        self.resolutions.iter().map(|r| &r.entry)
    }

    /// Returns true if any group was flagged for a concept disagreement.
    #[must_use]
    pub fn has_ambiguous_concepts(&self) -> bool {
        self.resolutions.iter().any(|r| r.ambiguous_concept)
    }
}

/// Runs NameGraph then MergeResolver over `suggestions`.
#[must_use]
pub fn reconcile(suggestions: &[Suggestion]) -> Reconciliation {
    let groups = cluster(suggestions);
    let resolutions = MergeResolver::new(suggestions).resolve(&groups);
    Reconciliation {
        groups,
        resolutions,
    }
}

/// Prepared entries for `suggestions`.
#[must_use]
pub fn prepare_entries(suggestions: &[Suggestion]) -> Vec<PreparedEntry> {
    let groups = cluster(suggestions);
    MergeResolver::new(suggestions).entries(&groups)
}
