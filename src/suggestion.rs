//! AI-proposed wiki entries awaiting review.
//!
//! A suggestion is produced by an analysis job and identified by its `name`
//! within that job. Suggestions refer to each other only by name through
//! `merge_targets`; a target may name a suggestion that is not part of the
//! job at all.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::page::{ConceptId, EntityCandidate, PageId, SourcePage};

/// Whether a suggestion creates a new page or updates an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionMode {
    /// A new page will be generated.
    #[default]
    Create,
    /// An existing page with the same name and concept will be updated.
    Update,
}

impl fmt::Display for SuggestionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// An AI-proposed new or updated wiki entry.
///
/// # Examples
///
/// ```
/// use scribe::{SourcePage, Suggestion};
///
/// let s = Suggestion::builder("Aurelia")
///     .concept(3, "City")
///     .source_page(SourcePage::new(10, "Travelogue"))
///     .merge_target("Aurel")
///     .build()
///     .unwrap();
/// assert!(s.has_merge_targets());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Unique within one job.
    pub name: String,

    #[serde(default)]
    pub concept_id: Option<ConceptId>,

    /// Display name of the concept.
    #[serde(default)]
    pub concept: Option<String>,

    #[serde(default)]
    pub source_pages: Vec<SourcePage>,

    /// Names of other suggestions describing the same entity.
    #[serde(default)]
    pub merge_targets: Vec<String>,

    #[serde(default)]
    pub mode: SuggestionMode,

    /// A live page with this name and concept already exists.
    #[serde(default)]
    pub exists: bool,
}

impl Suggestion {
    /// Creates a bare suggestion with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            concept_id: None,
            concept: None,
            source_pages: Vec::new(),
            merge_targets: Vec::new(),
            mode: SuggestionMode::Create,
            exists: false,
        }
    }

    /// Creates a builder for a suggestion named `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SuggestionBuilder {
        SuggestionBuilder::new(name)
    }

    /// Returns true if the suggestion declares at least one merge target.
    #[must_use]
    pub fn has_merge_targets(&self) -> bool {
        !self.merge_targets.is_empty()
    }

    /// Declares `target` as referring to the same entity.
    ///
    /// Returns false if the target was already declared.
    pub fn add_merge_target(&mut self, target: impl Into<String>) -> bool {
        let target = target.into();
        if self.merge_targets.contains(&target) {
            return false;
        }
        self.merge_targets.push(target);
        true
    }

    /// Removes a merge target. Returns true if it was present.
    pub fn remove_merge_target(&mut self, target: &str) -> bool {
        let before = self.merge_targets.len();
        self.merge_targets.retain(|t| t != target);
        before != self.merge_targets.len()
    }

    /// Ids of the pages this suggestion was derived from, in order.
    pub fn source_page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        self.source_pages.iter().map(|p| p.id)
    }

    /// Returns true if `page` is the live page this suggestion describes:
    /// same concept and the same name ignoring case.
    #[must_use]
    pub fn describes(&self, page: &EntityCandidate) -> bool {
        self.concept_id == Some(page.concept_id)
            && self.name.trim().to_lowercase() == page.name.trim().to_lowercase()
    }

    /// Records whether a matching live page exists and switches the mode
    /// accordingly.
    pub fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
        self.mode = if exists {
            SuggestionMode::Update
        } else {
            SuggestionMode::Create
        };
    }
}

/// Builder for creating [`Suggestion`] instances.
#[derive(Debug, Clone)]
pub struct SuggestionBuilder {
    name: String,
    concept_id: Option<ConceptId>,
    concept: Option<String>,
    source_pages: Vec<SourcePage>,
    merge_targets: Vec<String>,
    mode: SuggestionMode,
    exists: bool,
}

impl SuggestionBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            concept_id: None,
            concept: None,
            source_pages: Vec::new(),
            merge_targets: Vec::new(),
            mode: SuggestionMode::Create,
            exists: false,
        }
    }

    /// Sets the concept id and display name.
    #[must_use]
    pub fn concept(mut self, concept_id: i64, concept: impl Into<String>) -> Self {
        self.concept_id = Some(ConceptId::new(concept_id));
        self.concept = Some(concept.into());
        self
    }

    /// Sets only the concept id.
    #[must_use]
    pub fn concept_id(mut self, concept_id: ConceptId) -> Self {
        self.concept_id = Some(concept_id);
        self
    }

    /// Appends a provenance record.
    #[must_use]
    pub fn source_page(mut self, page: SourcePage) -> Self {
        self.source_pages.push(page);
        self
    }

    /// Appends a merge target.
    #[must_use]
    pub fn merge_target(mut self, target: impl Into<String>) -> Self {
        self.merge_targets.push(target.into());
        self
    }

    /// Sets the mode.
    #[must_use]
    pub fn mode(mut self, mode: SuggestionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the exists flag.
    #[must_use]
    pub fn exists(mut self, exists: bool) -> Self {
        self.exists = exists;
        self
    }

    /// Builds the suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySuggestionName`] if the name is blank.
    pub fn build(self) -> Result<Suggestion, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptySuggestionName);
        }

        Ok(Suggestion {
            name: self.name,
            concept_id: self.concept_id,
            concept: self.concept,
            source_pages: self.source_pages,
            merge_targets: self.merge_targets,
            mode: self.mode,
            exists: self.exists,
        })
    }
}
