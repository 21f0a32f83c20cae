//! Configuration for the linker and the batch worker pool.
//!
//! Every section has working defaults, so a partial JSON document (or none
//! at all) yields a usable configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ScribeError, ScribeResult, ValidationError};

/// Markup produced by the auto-linker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// CSS class on inserted anchors.
    pub link_class: String,
    /// Leading path segment of page routes.
    pub route_prefix: String,
    /// Add `title="{name}"` to inserted anchors.
    pub title_attribute: bool,
    /// Link only the first occurrence of each name.
    pub first_occurrence_only: bool,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            link_class: "wiki-link".to_string(),
            route_prefix: "/worlds".to_string(),
            title_attribute: false,
            first_occurrence_only: false,
        }
    }
}

impl LinkerConfig {
    /// Settings used when links are written back into stored page content:
    /// one link per name, with a title attribute.
    #[must_use]
    pub fn persisted() -> Self {
        Self {
            title_attribute: true,
            first_occurrence_only: true,
            ..Self::default()
        }
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the class is blank or the route prefix
    /// is not an absolute path without a trailing slash.
    pub fn validate(self) -> ScribeResult<Self> {
        if self.link_class.trim().is_empty() {
            return Err(invalid("linker.link_class", "must not be empty"));
        }
        if self.link_class.contains('"') {
            return Err(invalid("linker.link_class", "must not contain quotes"));
        }
        if !self.route_prefix.starts_with('/') {
            return Err(invalid("linker.route_prefix", "must start with '/'"));
        }
        if self.route_prefix.len() > 1 && self.route_prefix.ends_with('/') {
            return Err(invalid("linker.route_prefix", "must not end with '/'"));
        }
        Ok(self)
    }
}

/// Worker pool used by the batch linker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of link workers.
    pub workers: usize,
    /// Maximum queued jobs.
    pub queue_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 256,
        }
    }
}

impl BatchConfig {
    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either bound is zero.
    pub fn validate(self) -> ScribeResult<Self> {
        if self.workers == 0 {
            return Err(invalid("batch.workers", "must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(invalid("batch.queue_capacity", "must be at least 1"));
        }
        Ok(self)
    }
}

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use scribe::ScribeConfig;
///
/// let config = ScribeConfig::from_json(r#"{"batch": {"workers": 4}}"#).unwrap();
/// assert_eq!(config.batch.workers, 4);
/// assert_eq!(config.linker.link_class, "wiki-link");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribeConfig {
    pub linker: LinkerConfig,
    pub batch: BatchConfig,
}

impl ScribeConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an internal error for malformed JSON and a validation error
    /// for out-of-range values.
    pub fn from_json(s: &str) -> ScribeResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| ScribeError::internal(format!("parse config: {e}")))?;
        config.validate()
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(self) -> ScribeResult<Self> {
        Ok(Self {
            linker: self.linker.validate()?,
            batch: self.batch.validate()?,
        })
    }
}

fn invalid(field: &str, reason: &str) -> ScribeError {
    ValidationError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScribeConfig::default().validate().is_ok());
        assert!(LinkerConfig::persisted().validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ScribeConfig::from_json("{}").unwrap();
        assert_eq!(config, ScribeConfig::default());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = ScribeConfig::from_json(r#"{"batch": {"workers": 0}}"#).unwrap_err();
        assert!(err.is_validation());
        assert!(format!("{err}").contains("batch.workers"));
    }

    #[test]
    fn test_route_prefix_must_be_absolute() {
        let config = LinkerConfig {
            route_prefix: "worlds".to_string(),
            ..LinkerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LinkerConfig {
            route_prefix: "/worlds/".to_string(),
            ..LinkerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_internal_error() {
        let err = ScribeConfig::from_json("{not json").unwrap_err();
        assert!(err.is_internal());
    }
}
