// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Durable Ingest
//!
//! A durable ingestion runtime bridging long-lived external event sources
//! (websocket feeds, realtime subscriptions) to downstream write targets
//! (batch-insert tables and single-record streams), preserving
//! at-least-once delivery across reconnects and process restarts.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Pipeline Runner (C6)                    │
//! │  connection lifecycle · backoff · disconnect · stop/done     │
//! └──────────────────────────────────────────────────────────────┘
//!            │ owns one per attempt
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Event Processor (C5)                     │
//! │  FIFO worker · parse → process → write → checkpoint          │
//! └──────────────────────────────────────────────────────────────┘
//!       │ consults                  │ writes through        │ saves
//! ┌──────────────┐       ┌──────────────────┐     ┌──────────────────┐
//! │ Resource Set │       │   Sink Writer    │     │ Checkpoint Store │
//! │     (C4)     │       │      (C3)        │     │      (C2)        │
//! └──────────────┘       └──────────────────┘     └──────────────────┘
//! ```
//!
//! The reconnect policy (C1) is consulted only between attempts.
//!
//! ## Core Guarantees
//!
//! - **Write-then-checkpoint**: a checkpoint is persisted only after all
//!   records that produced it have been written, and the in-memory cursor
//!   advances only after the save resolves.
//! - **Single-writer serialization**: raw messages are processed in emit
//!   order; records for message *k* land before any record of *k+1*;
//!   resources act in declaration order with no interleaving.
//! - **At-least-once delivery**: on failure the cursor never moves past
//!   the failed write, so a resuming source replays from the last durable
//!   checkpoint. Exactly-once is explicitly out of scope.
//! - **Cooperative lifecycle**: the caller gets a `{stop, done}` control
//!   surface; `stop()` is idempotent and resolves only after the loop has
//!   fully exited.
//!
//! ## Quick Start
//!
//! Implement [`EventSource`] for your provider, declare resources with a
//! parse/process handler and a destination, and build:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use durable_ingest::{PipelineBuilder, MemoryCheckpointStore};
//! # use durable_ingest_domain::Resource;
//! # async fn example(
//! #     source: impl durable_ingest::EventSource + 'static,
//! #     trades: Resource,
//! # ) -> Result<(), durable_ingest_domain::IngestError> {
//! let handle = PipelineBuilder::new("exchange/trades")
//!     .source(source)
//!     .resource(trades)
//!     .checkpoint_store(Arc::new(MemoryCheckpointStore::new()))
//!     .build()?
//!     .start();
//!
//! // ... until the workflow shell asks us to wind down:
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! The outer workflow shell (scheduling, task retries, logging sinks) is
//! deliberately out of scope; this crate hands it the control surface and
//! nothing else.

pub mod application;
pub mod infrastructure;
pub mod sources;

// Re-export the domain layer for convenient single-crate consumption.
pub use durable_ingest_domain::{
    Checkpoint, CheckpointStore, Destination, ErrorCategory, FnResourceHandler, IngestError,
    Parsed, Payload, PipelineId, ProcessInput, ProcessOutput, RawMessage, ReconnectPolicy, Record,
    Resource, ResourceHandler, ResourceName, ResourceSet, StreamDestination, TableDestination,
};

pub use crate::application::pipeline_builder::PipelineBuilder;
pub use crate::application::services::event_processor::{EventProcessor, RawDelivery, RawSender};
pub use crate::application::services::pipeline_runner::{ErrorObserver, Pipeline, PipelineHandle};
pub use crate::application::services::sink_writer::SinkWriter;
pub use crate::infrastructure::config::CheckpointStoreConfig;
pub use crate::infrastructure::repositories::{
    MemoryCheckpointStore, SqliteCheckpointStore, StoreOptions,
};
pub use crate::infrastructure::runtime::{CancellationToken, DisconnectHandle, DisconnectSignal};
pub use crate::sources::{EventSource, SourceContext, SourceHandle};
