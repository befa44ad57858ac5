// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Identifier
//!
//! Type-safe identifier for a pipeline. The id is a caller-supplied stable
//! string: it keys the checkpoint store, so the same id across process
//! restarts resumes the same cursor. It is not generated by the runtime.
//!
//! ## Validation Rules
//!
//! - Non-empty, at most 256 characters
//! - Starts with an alphanumeric character
//! - Remaining characters: alphanumerics plus `.`, `_`, `-`, `:`, `/`
//!   (the separators deployments commonly use to namespace pipelines)
//!
//! ## Usage
//!
//! ```
//! use durable_ingest_domain::PipelineId;
//!
//! let id = PipelineId::new("analytics/pageviews-v2").unwrap();
//! assert_eq!(id.as_str(), "analytics/pageviews-v2");
//! assert!(PipelineId::new("").is_err());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IngestError;

/// Maximum accepted length of a pipeline id, in bytes.
pub const MAX_PIPELINE_ID_LEN: usize = 256;

static PIPELINE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:/-]*$").expect("valid pipeline id pattern"));

/// Unique identifier for a pipeline.
///
/// Wraps a validated string. Two ids are equal when their strings are
/// equal; the runtime attaches no further meaning to the value beyond
/// using it as the checkpoint store key.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PipelineId(String);

impl PipelineId {
    /// Creates a pipeline id from a string, validating it.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidConfiguration`] when the string is
    /// empty, too long, or contains characters outside the accepted set.
    pub fn new(id: impl Into<String>) -> Result<Self, IngestError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IngestError::invalid_config("pipeline id cannot be empty"));
        }
        if id.len() > MAX_PIPELINE_ID_LEN {
            return Err(IngestError::invalid_config(format!(
                "pipeline id exceeds {} characters: '{}'",
                MAX_PIPELINE_ID_LEN, id
            )));
        }
        if !PIPELINE_ID_PATTERN.is_match(&id) {
            return Err(IngestError::invalid_config(format!(
                "pipeline id contains invalid characters: '{}'",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PipelineId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PipelineId {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PipelineId {
    type Error = IngestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PipelineId> for String {
    fn from(id: PipelineId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for id in [
            "orders",
            "analytics/pageviews-v2",
            "team:events.clicks",
            "a",
            "0numeric-start",
        ] {
            assert!(PipelineId::new(id).is_ok(), "expected '{}' to be valid", id);
        }
    }

    #[test]
    fn test_rejects_empty_and_bad_characters() {
        assert!(PipelineId::new("").is_err());
        assert!(PipelineId::new(" spaces ").is_err());
        assert!(PipelineId::new("-leading-dash").is_err());
        assert!(PipelineId::new("tab\tseparated").is_err());
    }

    #[test]
    fn test_rejects_overlong_id() {
        let long = "a".repeat(MAX_PIPELINE_ID_LEN + 1);
        assert!(PipelineId::new(long).is_err());
        let max = "a".repeat(MAX_PIPELINE_ID_LEN);
        assert!(PipelineId::new(max).is_ok());
    }

    #[test]
    fn test_serde_round_trip_revalidates() {
        let id = PipelineId::new("orders").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"orders\"");
        let back: PipelineId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<PipelineId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
