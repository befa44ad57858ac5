// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Destination Ports
//!
//! Write targets behind the sink writer. Two destination shapes exist:
//!
//! - **Table**: batch-oriented. Records are validated one by one via
//!   [`TableDestination::assert_valid_record`], then written with a single
//!   [`TableDestination::insert`] call.
//! - **Stream**: record-oriented. Records are sent one at a time, in
//!   order, via [`StreamDestination::send`].
//!
//! The shapes are distinguished by **capability probing** on the
//! [`Destination`] trait rather than a closed tag: a destination overrides
//! `as_table` or `as_stream` (table wins when both are offered), and a
//! destination offering neither fails writes with
//! `UnsupportedDestination`. Implementations must be safe for concurrent
//! use from different pipelines; within one pipeline the runtime
//! guarantees writes are serialized.

use async_trait::async_trait;

use crate::error::IngestError;
use crate::value_objects::Record;

/// A write target, discovered by capability.
pub trait Destination: Send + Sync {
    /// Returns the table capability, if this destination is a table.
    fn as_table(&self) -> Option<&dyn TableDestination> {
        None
    }

    /// Returns the stream capability, if this destination is a stream.
    fn as_stream(&self) -> Option<&dyn StreamDestination> {
        None
    }
}

/// Batch-insert table capability.
#[async_trait]
pub trait TableDestination: Send + Sync {
    /// Validates one record, returning the form to insert.
    ///
    /// Implementations may return a shallow-copied, normalized record; the
    /// caller's record is never mutated.
    ///
    /// # Errors
    /// Any error fails the whole batch before `insert` is attempted.
    fn assert_valid_record(&self, record: &Record) -> Result<Record, IngestError>;

    /// Inserts a batch of validated records.
    async fn insert(&self, records: Vec<Record>) -> Result<(), IngestError>;
}

/// Single-record stream capability.
#[async_trait]
pub trait StreamDestination: Send + Sync {
    /// Sends one record. Sends for a batch happen sequentially, in order.
    async fn send(&self, record: Record) -> Result<(), IngestError>;
}
