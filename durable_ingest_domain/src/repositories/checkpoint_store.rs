// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checkpoint Store Port
//!
//! Persistence contract for resume cursors, keyed by pipeline id. The
//! runtime saves a checkpoint only after the records it represents have
//! been written; on restart it loads the last persisted value and hands it
//! to the source so the provider can replay from there (when supported).
//!
//! ## Contract
//!
//! - `load` returns the most recently saved checkpoint, or `None` when
//!   nothing was ever saved or the entry expired. Expiry is a reclamation
//!   mechanism, not a correctness one: a `None` after eviction is
//!   indistinguishable from first start.
//! - `save` atomically overwrites the stored value. A failed save must
//!   not leave partial state visible to a subsequent `load`.
//! - A successfully awaited `save` must be visible to a subsequent `load`
//!   across process restarts (crash safety).
//! - Saves under distinct pipeline ids never conflict. Consecutive saves
//!   from a single processor instance are issued serially by the runtime.
//!
//! Implementations must be thread-safe (`Send + Sync`); one store is
//! typically shared by every pipeline in a deployment.

use async_trait::async_trait;

use crate::error::IngestError;
use crate::value_objects::{Checkpoint, PipelineId};

/// Persistence port for per-pipeline resume cursors.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Loads the most recently saved checkpoint for `pipeline_id`.
    async fn load(&self, pipeline_id: &PipelineId) -> Result<Option<Checkpoint>, IngestError>;

    /// Atomically overwrites the checkpoint stored for `pipeline_id`.
    async fn save(
        &self,
        pipeline_id: &PipelineId,
        checkpoint: &Checkpoint,
    ) -> Result<(), IngestError>;
}
