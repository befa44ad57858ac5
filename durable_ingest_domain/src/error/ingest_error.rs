// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Ingestion Error System
//!
//! This module provides the error type shared by every layer of the
//! ingestion runtime. The design goals are:
//!
//! - **Domain-Specific**: Errors name ingestion concepts (resources, sinks,
//!   checkpoints, connections), not transport or library internals.
//! - **Attributable**: Write and process failures carry the name of the
//!   resource that produced them, so a single pipeline carrying many
//!   resources still yields actionable diagnostics.
//! - **Cloneable**: Errors flow through one-shot latches and observer
//!   callbacks, both of which hand out copies; every variant is `Clone`.
//! - **Categorized**: [`ErrorCategory`] groups variants for operator-side
//!   logging and alerting without matching on individual variants.
//!
//! ## Propagation Policy
//!
//! Errors raised while processing a raw message fail that message's
//! completion, resolve the connection's disconnect signal, and drive a
//! drain-and-reconnect cycle. The runtime never classifies a connection
//! failure as fatal: every failure is reported to the configured error
//! observer and retried under the reconnect policy. Construction-time
//! errors (for example [`IngestError::DuplicateResource`]) are synchronous
//! and prevent the pipeline from ever starting.

use thiserror::Error;

/// Errors raised by the ingestion domain and runtime.
///
/// Each variant carries a human-readable description. Variants that concern
/// a single resource carry its name so failures in a multi-resource
/// pipeline can be attributed.
#[derive(Error, Debug, Clone)]
pub enum IngestError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Duplicate resource name: {0}")]
    DuplicateResource(String),

    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Invalid process output for resource '{resource}': {detail}")]
    InvalidProcessOutput { resource: String, detail: String },

    #[error("Destination for resource '{resource}' supports neither table nor stream writes")]
    UnsupportedDestination { resource: String },

    #[error("Invalid record shape for resource '{resource}': {detail}")]
    InvalidRecordShape { resource: String, detail: String },

    #[error("Table write failed for resource '{resource}': {cause}")]
    TableWriteFailed { resource: String, cause: String },

    #[error("Stream write failed for resource '{resource}': {cause}")]
    StreamWriteFailed { resource: String, cause: String },

    #[error("Checkpoint save failed: {0}")]
    CheckpointSaveFailed(String),

    #[error("Checkpoint load failed: {0}")]
    CheckpointLoadFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IngestError {
    /// Creates a new configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new duplicate-resource error
    pub fn duplicate_resource(name: impl Into<String>) -> Self {
        Self::DuplicateResource(name.into())
    }

    /// Creates a new connect-failed error
    pub fn connect_failed(msg: impl Into<String>) -> Self {
        Self::ConnectFailed(msg.into())
    }

    /// Creates a new connection-lost error
    pub fn connection_lost(msg: impl Into<String>) -> Self {
        Self::ConnectionLost(msg.into())
    }

    /// Creates a new invalid-process-output error for a resource
    pub fn invalid_process_output(resource: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidProcessOutput {
            resource: resource.into(),
            detail: detail.into(),
        }
    }

    /// Creates a new unsupported-destination error for a resource
    pub fn unsupported_destination(resource: impl Into<String>) -> Self {
        Self::UnsupportedDestination {
            resource: resource.into(),
        }
    }

    /// Creates a new invalid-record-shape error for a resource
    pub fn invalid_record_shape(resource: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidRecordShape {
            resource: resource.into(),
            detail: detail.into(),
        }
    }

    /// Creates a new table-write error for a resource
    pub fn table_write_failed(resource: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::TableWriteFailed {
            resource: resource.into(),
            cause: cause.into(),
        }
    }

    /// Creates a new stream-write error for a resource
    pub fn stream_write_failed(resource: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::StreamWriteFailed {
            resource: resource.into(),
            cause: cause.into(),
        }
    }

    /// Creates a new checkpoint-save error
    pub fn checkpoint_save_failed(msg: impl Into<String>) -> Self {
        Self::CheckpointSaveFailed(msg.into())
    }

    /// Creates a new checkpoint-load error
    pub fn checkpoint_load_failed(msg: impl Into<String>) -> Self {
        Self::CheckpointLoadFailed(msg.into())
    }

    /// Creates a new serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Creates a new database error
    pub fn database_error(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Creates a new cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Returns the category this error belongs to.
    ///
    /// Categories group variants for logging and alerting; they do not
    /// drive runtime behavior (every connection-phase failure is retried
    /// regardless of category).
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration(_) | Self::DuplicateResource(_) => {
                ErrorCategory::Configuration
            }
            Self::ConnectFailed(_) | Self::ConnectionLost(_) => ErrorCategory::Connection,
            Self::InvalidProcessOutput { .. }
            | Self::UnsupportedDestination { .. }
            | Self::InvalidRecordShape { .. }
            | Self::TableWriteFailed { .. }
            | Self::StreamWriteFailed { .. } => ErrorCategory::Processing,
            Self::CheckpointSaveFailed(_)
            | Self::CheckpointLoadFailed(_)
            | Self::SerializationError(_)
            | Self::DatabaseError(_) => ErrorCategory::Persistence,
            Self::Cancelled(_) | Self::InternalError(_) => ErrorCategory::System,
        }
    }

    /// Returns the name of the resource this error is attributed to, if any.
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::InvalidProcessOutput { resource, .. }
            | Self::UnsupportedDestination { resource }
            | Self::InvalidRecordShape { resource, .. }
            | Self::TableWriteFailed { resource, .. }
            | Self::StreamWriteFailed { resource, .. } => Some(resource),
            _ => None,
        }
    }
}

/// Coarse classification of [`IngestError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Build-time configuration and validation failures
    Configuration,
    /// Source connection establishment and loss
    Connection,
    /// Parse, process, and sink write failures
    Processing,
    /// Checkpoint store and serialization failures
    Persistence,
    /// Cancellation and unexpected internal failures
    System,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_resource() {
        let err = IngestError::table_write_failed("pageviews", "insert rejected");
        assert_eq!(
            err.to_string(),
            "Table write failed for resource 'pageviews': insert rejected"
        );
        assert_eq!(err.resource(), Some("pageviews"));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            IngestError::duplicate_resource("foo").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            IngestError::connect_failed("refused").category(),
            ErrorCategory::Connection
        );
        assert_eq!(
            IngestError::stream_write_failed("a", "b").category(),
            ErrorCategory::Processing
        );
        assert_eq!(
            IngestError::checkpoint_save_failed("timeout").category(),
            ErrorCategory::Persistence
        );
        assert_eq!(
            IngestError::cancelled("stop requested").category(),
            ErrorCategory::System
        );
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err = IngestError::invalid_record_shape("events", "expected object");
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
        assert_eq!(copy.resource(), Some("events"));
    }

    #[test]
    fn test_non_attributed_errors_have_no_resource() {
        assert_eq!(IngestError::checkpoint_save_failed("x").resource(), None);
        assert_eq!(IngestError::connect_failed("x").resource(), None);
    }
}
