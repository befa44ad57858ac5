// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checkpoint
//!
//! An opaque, provider-defined resume cursor. The runtime stores and
//! restores checkpoints; it never interprets their contents. A checkpoint
//! becomes durable only after every record that produced it has been
//! written to its destination.
//!
//! ## Shape and Encoding
//!
//! A checkpoint is a keyed container (a JSON object). For storage it
//! serializes through [`Checkpoint::to_stable_json`], which emits keys in
//! sorted order so the same checkpoint always produces the same bytes.
//! [`Checkpoint::from_json`] inverts the encoding bit-for-bit.
//!
//! ## Usage
//!
//! ```
//! use durable_ingest_domain::Checkpoint;
//! use serde_json::json;
//!
//! let cp = Checkpoint::from_value(json!({"seq": 42, "shard": "a"})).unwrap();
//! let encoded = cp.to_stable_json().unwrap();
//! assert_eq!(Checkpoint::from_json(&encoded).unwrap(), cp);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::IngestError;

/// Opaque keyed cursor persisted after successful writes.
///
/// Equality is value equality on the underlying object, which is what the
/// round-trip guarantee of the checkpoint store is stated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Checkpoint(Map<String, Value>);

impl Checkpoint {
    /// Creates a checkpoint from a JSON value.
    ///
    /// # Errors
    /// Returns [`IngestError::SerializationError`] when the value is not a
    /// JSON object. Arrays, scalars, and `null` are not keyed containers.
    pub fn from_value(value: Value) -> Result<Self, IngestError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(IngestError::serialization_error(format!(
                "checkpoint must be a keyed object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Creates a checkpoint directly from a JSON object map.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the underlying object map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the checkpoint, returning it as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Serializes to the stable storage encoding (sorted keys).
    ///
    /// # Errors
    /// Returns [`IngestError::SerializationError`] if encoding fails.
    pub fn to_stable_json(&self) -> Result<String, IngestError> {
        serde_json::to_string(&self.0)
            .map_err(|e| IngestError::serialization_error(format!("checkpoint encode: {}", e)))
    }

    /// Parses a checkpoint from its stable storage encoding.
    ///
    /// # Errors
    /// Returns [`IngestError::SerializationError`] when the input is not a
    /// JSON object.
    pub fn from_json(encoded: &str) -> Result<Self, IngestError> {
        let value: Value = serde_json::from_str(encoded)
            .map_err(|e| IngestError::serialization_error(format!("checkpoint decode: {}", e)))?;
        Self::from_value(value)
    }
}

/// Short description of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
