// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Ingestion Domain
//!
//! Pure contracts and value objects for the durable ingestion runtime.
//! This crate is independent of storage technology, transport, and the
//! async runtime; the sibling `durable-ingest` crate supplies the
//! machinery (event processor, run loop, checkpoint stores).
//!
//! ## Module Structure
//!
//! - **`value_objects`** — immutable, self-validating concepts:
//!   [`PipelineId`], [`ResourceName`], [`Checkpoint`], [`Record`],
//!   [`ReconnectPolicy`].
//! - **`entities`** — [`Resource`], the named routing unit binding a
//!   handler to a destination.
//! - **`aggregates`** — [`ResourceSet`], enforcing unique names and
//!   declaration order over a pipeline's resources.
//! - **`services`** — contracts implemented by integrators: the
//!   [`ResourceHandler`] parse/process pair and the destination ports
//!   ([`Destination`], [`TableDestination`], [`StreamDestination`]).
//! - **`repositories`** — persistence ports: [`CheckpointStore`].
//! - **`error`** — [`IngestError`], the error type shared by every layer.
//!
//! ## Core Flow
//!
//! A source delivers opaque [`RawMessage`]s. Each resource's `parse`
//! filters a message into zero or more [`Payload`]s; `process` turns one
//! payload into [`Record`]s plus an optional [`Checkpoint`]. Records are
//! written to the resource's destination, and only then is the checkpoint
//! persisted — the write-then-checkpoint rule that makes delivery
//! at-least-once across reconnects and restarts.
//!
//! ## Design Constraints
//!
//! - The runtime never interprets raw messages, payloads, or checkpoint
//!   contents; they are opaque keyed containers.
//! - Async appears only at the I/O ports (`async-trait`); parse and
//!   process are synchronous transforms.
//! - No tokio dependency here: scheduling belongs to the runtime crate.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use aggregates::ResourceSet;
pub use entities::Resource;
pub use error::{ErrorCategory, IngestError};
pub use repositories::CheckpointStore;
pub use services::{
    Destination, FnResourceHandler, Parsed, Payload, ProcessInput, ProcessOutput, RawMessage,
    ResourceHandler, StreamDestination, TableDestination,
};
pub use value_objects::{Checkpoint, PipelineId, ReconnectPolicy, Record, ResourceName};
