// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Resource Name
//!
//! Name of a routing unit inside a pipeline. Resource names must be unique
//! within a pipeline; the resource set enforces that at construction.
//!
//! Validation: non-empty, at most 128 characters, alphanumeric start,
//! then alphanumerics plus `.`, `_`, `-`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IngestError;

/// Maximum accepted length of a resource name, in bytes.
pub const MAX_RESOURCE_NAME_LEN: usize = 128;

static RESOURCE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid resource name pattern"));

/// Validated name of a resource within a pipeline.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName(String);

impl ResourceName {
    /// Creates a resource name from a string, validating it.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidConfiguration`] when the string is
    /// empty, too long, or contains characters outside the accepted set.
    pub fn new(name: impl Into<String>) -> Result<Self, IngestError> {
        let name = name.into();
        if name.is_empty() {
            return Err(IngestError::invalid_config("resource name cannot be empty"));
        }
        if name.len() > MAX_RESOURCE_NAME_LEN {
            return Err(IngestError::invalid_config(format!(
                "resource name exceeds {} characters: '{}'",
                MAX_RESOURCE_NAME_LEN, name
            )));
        }
        if !RESOURCE_NAME_PATTERN.is_match(&name) {
            return Err(IngestError::invalid_config(format!(
                "resource name contains invalid characters: '{}'",
                name
            )));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceName {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceName {
    type Error = IngestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceName> for String {
    fn from(name: ResourceName) -> Self {
        name.0
    }
}
