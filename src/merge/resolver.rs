//! Canonical record selection and provenance union per merge group.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::merge::graph::MergeGroup;
use crate::page::{ConceptId, PageId, SourcePage};
use crate::suggestion::Suggestion;

/// Canonical output record for one merge group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedEntry {
    pub name: String,
    pub concept_id: Option<ConceptId>,

    /// Deduplicated union of every member's source pages, first-seen order.
    pub source_page_ids: Vec<PageId>,
}

/// Full outcome of resolving one group.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub entry: PreparedEntry,

    /// Members that matched a suggestion record, in original array order.
    pub members: Vec<String>,

    /// Union of source pages keyed by id; a later duplicate id replaces the
    /// earlier record in place.
    pub source_pages: Vec<SourcePage>,

    /// More than one member with merge targets carried a different concept.
    /// The canonical choice is kept as-is; this only flags it for review.
    pub ambiguous_concept: bool,
}

/// Picks one canonical record per group and merges provenance.
///
/// The resolver never fails: names without a matching record are dropped
/// and groups left empty produce no output.
///
/// # Examples
///
/// ```
/// use scribe::{cluster, MergeResolver, Suggestion};
///
/// let mut a = Suggestion::new("Aurel");
/// a.add_merge_target("Aurelia");
/// let suggestions = vec![Suggestion::new("Aurelia"), a];
///
/// let groups = cluster(&suggestions);
/// let entries = MergeResolver::new(&suggestions).entries(&groups);
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].name, "Aurel");
/// ```
#[derive(Debug)]
pub struct MergeResolver<'a> {
    suggestions: &'a [Suggestion],
    by_name: HashMap<&'a str, usize>,
}

impl<'a> MergeResolver<'a> {
    /// Indexes `suggestions` by name. On duplicate names the first record wins.
    #[must_use]
    pub fn new(suggestions: &'a [Suggestion]) -> Self {
        let mut by_name = HashMap::with_capacity(suggestions.len());
        for (idx, s) in suggestions.iter().enumerate() {
            by_name.entry(s.name.as_str()).or_insert(idx);
        }
        Self {
            suggestions,
            by_name,
        }
    }

    /// Resolves a single group. Returns `None` if no member has a record.
    #[must_use]
    pub fn resolve_group(&self, group: &MergeGroup) -> Option<Resolution> {
        let mut indices: Vec<usize> = group
            .iter()
            .filter_map(|name| self.by_name.get(name).copied())
            .collect();
        if indices.is_empty() {
            return None;
        }
        indices.sort_unstable();
        indices.dedup();

        let records: Vec<&Suggestion> = indices.iter().map(|&i| &self.suggestions[i]).collect();

        let canonical = records
            .iter()
            .copied()
            .find(|s| s.has_merge_targets())
            .unwrap_or(records[0]);

        let concepts: HashSet<Option<ConceptId>> = records
            .iter()
            .filter(|s| s.has_merge_targets())
            .map(|s| s.concept_id)
            .collect();
        let ambiguous_concept = concepts.len() > 1;
        if ambiguous_concept {
            warn!(
                canonical = %canonical.name,
                members = records.len(),
                "merge group members disagree on concept; keeping canonical record's concept"
            );
        }

        let mut order: Vec<PageId> = Vec::new();
        let mut pages: HashMap<PageId, SourcePage> = HashMap::new();
        for record in &records {
            for page in &record.source_pages {
                if pages.insert(page.id, page.clone()).is_none() {
                    order.push(page.id);
                }
            }
        }
        let source_pages: Vec<SourcePage> = order
            .iter()
            .filter_map(|id| pages.remove(id))
            .collect();

        Some(Resolution {
            entry: PreparedEntry {
                name: canonical.name.clone(),
                concept_id: canonical.concept_id,
                source_page_ids: order,
            },
            members: records.iter().map(|s| s.name.clone()).collect(),
            source_pages,
            ambiguous_concept,
        })
    }

    /// Resolves every group, skipping those left empty.
    #[must_use]
    pub fn resolve(&self, groups: &[MergeGroup]) -> Vec<Resolution> {
        let resolved: Vec<Resolution> = groups.iter().filter_map(|g| self.resolve_group(g)).collect();
        debug!(
            groups = groups.len(),
            entries = resolved.len(),
            "resolved merge groups"
        );
        resolved
    }

    /// Resolves every group and keeps only the prepared entries.
    #[must_use]
    pub fn entries(&self, groups: &[MergeGroup]) -> Vec<PreparedEntry> {
        self.resolve(groups).into_iter().map(|r| r.entry).collect()
    }
}
