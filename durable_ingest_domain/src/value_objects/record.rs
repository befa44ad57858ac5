// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Record
//!
//! A plain keyed container produced by a resource's `process` step and
//! accepted by destinations. Records in a batch keep their insertion
//! order; the runtime never mutates a record after construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::checkpoint::json_kind;

/// Immutable keyed container ready to write to a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates a record from a JSON value.
    ///
    /// Returns `Err` with a description of the offending kind when the
    /// value is not a JSON object; callers attach the resource name to
    /// build the attributed error.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(format!("expected a keyed object, got {}", json_kind(&other))),
        }
    }

    /// Creates a record directly from a JSON object map.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the underlying object map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the value stored under `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Consumes the record, returning it as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
