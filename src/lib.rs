//! # scribe - suggestion reconciliation and wiki auto-linking
//!
//! scribe sits between an analysis job that proposes new wiki pages and the
//! wiki that renders them. It does two things:
//!
//! - **Merge reconciliation**: suggestions that a reviewer declared to be the
//!   same entity are clustered into merge groups, and each group collapses
//!   into one prepared entry carrying the union of its provenance.
//! - **Auto-linking**: rendered page content gets every mention of a known
//!   page wrapped in a link to it, longest names first.
//!
//! ## Core Concepts
//!
//! - **Suggestion**: a proposed page with its source pages and merge targets
//! - **MergeGroup**: names that collapse into one output record
//! - **PreparedEntry**: the canonical record of a group
//! - **EntityCandidate**: an existing page that content may link to
//!
//! ## Usage
//!
//! ```rust
//! use scribe::{auto_link, prepare_entries, EntityCandidate, Suggestion, WorldId};
//!
//! let mut alias = Suggestion::new("Aurel");
//! alias.add_merge_target("Aurelia");
//! let entries = prepare_entries(&[Suggestion::new("Aurelia"), alias]);
//! assert_eq!(entries.len(), 1);
//!
//! let pages = vec![EntityCandidate::new(3, "Aurelia", 2, 1)];
//! let html = auto_link("Welcome to Aurelia.", &pages, WorldId::new(1), false);
//! assert!(html.contains(r#"href="/worlds/1/concept/2/page/3""#));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod error;
pub mod job;
pub mod page;
pub mod request;
pub mod suggestion;

// Engines
pub mod link;
pub mod merge;

// Seams and orchestration
pub mod pipeline;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use config::{BatchConfig, LinkerConfig, ScribeConfig};
pub use error::{ScribeError, ScribeResult, TransportError, ValidationError};
pub use job::{JobDocument, JobId, JobReceipt, JobStatus};
pub use page::{ConceptId, EntityCandidate, PageId, SourcePage, WorldId};
pub use request::GenerationRequest;
pub use suggestion::{Suggestion, SuggestionBuilder, SuggestionMode};

pub use link::{
	auto_link, BatchLinker, EntityLinker, InsertedLink, LinkContext, LinkJob, LinkOutcome,
	PageLinkResult, PageRoute,
};
pub use merge::{
	cluster, prepare_entries, reconcile, GroupKey, MergeGroup, MergeResolver, NameGraph,
	PreparedEntry, Reconciliation, Resolution,
};
pub use pipeline::{Pipeline, ReviewSession};
pub use storage::{
	GenerationSink, InMemoryGenerationSink, InMemoryPageDirectory, InMemorySuggestionSource,
	JobFileSource, PageDirectory, StorageError, SuggestionSource,
};
