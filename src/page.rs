//! Page identities, provenance records, and link candidates.
//!
//! Pages, concepts and worlds are identified by the integer keys issued by
//! the wiki backend. Wrapping them in distinct newtypes keeps a concept id
//! from ever being passed where a page id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! int_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an id from its raw backend value.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw backend value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

int_id!(
    /// Identifier of a wiki page.
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe::PageId;
    ///
    /// let id = PageId::new(42);
    /// assert_eq!(id.to_string(), "42");
    /// ```
    PageId
);

int_id!(
    /// Identifier of a concept (the category a page belongs to).
    ConceptId
);

int_id!(
    /// Identifier of a game world namespace.
    WorldId
);

/// Provenance record: a page a suggestion was derived from.
///
/// Only `id` and `name` are interpreted. Any other fields supplied by the
/// analysis job are preserved verbatim so they survive a round trip to the
/// generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePage {
    /// Page the suggestion was extracted from.
    pub id: PageId,

    /// Display name of that page.
    #[serde(default)]
    pub name: String,

    /// Fields carried through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SourcePage {
    /// Creates a provenance record with no extra fields.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: PageId(id),
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Attaches an extra field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A known page usable as an auto-link target.
///
/// # Examples
///
/// ```
/// use scribe::EntityCandidate;
///
/// let dragon = EntityCandidate::new(7, "Order of the Dragon", 3, 1);
/// assert_eq!(dragon.name, "Order of the Dragon");
/// assert!(!dragon.ignore_crosslink);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCandidate {
    pub id: PageId,
    pub name: String,
    pub concept_id: ConceptId,
    pub gameworld_id: WorldId,

    /// Pages can opt out of being link targets.
    #[serde(default)]
    pub ignore_crosslink: bool,
}

impl EntityCandidate {
    /// Creates a candidate.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, concept_id: i64, gameworld_id: i64) -> Self {
        Self {
            id: PageId(id),
            name: name.into(),
            concept_id: ConceptId(concept_id),
            gameworld_id: WorldId(gameworld_id),
            ignore_crosslink: false,
        }
    }

    /// Marks the candidate as excluded from auto-linking.
    #[must_use]
    pub fn ignoring_crosslinks(mut self) -> Self {
        self.ignore_crosslink = true;
        self
    }
}
