//! Storage seams and their backends.
//!
//! The traits are re-exported here; [`memory`] and [`file`] provide
//! implementations.

pub mod file;
pub mod memory;
mod traits;

pub use file::JobFileSource;
pub use memory::{InMemoryGenerationSink, InMemoryPageDirectory, InMemorySuggestionSource};
pub use traits::{GenerationSink, PageDirectory, StorageError, SuggestionSource};
