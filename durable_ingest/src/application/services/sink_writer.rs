// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sink Writer
//!
//! Adapts the two destination shapes behind one write operation with
//! per-resource error attribution.
//!
//! ## Behavior
//!
//! - An empty batch returns immediately, without touching the
//!   destination.
//! - Every element must be a plain keyed container; the first non-object
//!   fails the batch with `InvalidRecordShape` before any I/O.
//! - Capability probe, table first:
//!   - **Table**: all records are validated via `assert_valid_record`
//!     (collecting the validated forms), then written with one `insert`
//!     call. Validation or insert failure fails the whole batch as
//!     `TableWriteFailed`.
//!   - **Stream**: records are sent sequentially in order; the first
//!     failure stops further sends and surfaces as `StreamWriteFailed`.
//!   - Neither capability: `UnsupportedDestination`.
//!
//! The writer never mutates caller records; table validation may hand
//! back shallow-copied validated forms.

use serde_json::Value;
use tracing::{debug, error};

use durable_ingest_domain::{Destination, IngestError, Record, ResourceName};

/// Stateless destination dispatcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinkWriter;

impl SinkWriter {
    /// Creates a sink writer.
    pub fn new() -> Self {
        Self
    }

    /// Writes a batch of records to `destination` on behalf of `resource`.
    pub async fn write(
        &self,
        resource: &ResourceName,
        destination: &dyn Destination,
        records: &[Value],
    ) -> Result<(), IngestError> {
        if records.is_empty() {
            return Ok(());
        }

        // Shape check before any I/O: the whole batch must be keyed
        // containers or nothing is written.
        let mut batch = Vec::with_capacity(records.len());
        for value in records {
            let record = Record::from_value(value.clone())
                .map_err(|detail| IngestError::invalid_record_shape(resource.as_str(), detail))?;
            batch.push(record);
        }

        if let Some(table) = destination.as_table() {
            let mut validated = Vec::with_capacity(batch.len());
            for record in &batch {
                let valid = table.assert_valid_record(record).map_err(|e| {
                    IngestError::table_write_failed(resource.as_str(), e.to_string())
                })?;
                validated.push(valid);
            }
            let count = validated.len();
            table.insert(validated).await.map_err(|e| {
                error!(resource = %resource, error = %e, "table insert failed");
                IngestError::table_write_failed(resource.as_str(), e.to_string())
            })?;
            debug!(resource = %resource, records = count, "table batch inserted");
            return Ok(());
        }

        if let Some(stream) = destination.as_stream() {
            for record in batch {
                stream.send(record).await.map_err(|e| {
                    error!(resource = %resource, error = %e, "stream send failed");
                    IngestError::stream_write_failed(resource.as_str(), e.to_string())
                })?;
            }
            debug!(resource = %resource, records = records.len(), "stream batch sent");
            return Ok(());
        }

        Err(IngestError::unsupported_destination(resource.as_str()))
    }
}
