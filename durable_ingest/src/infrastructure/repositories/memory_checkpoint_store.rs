// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-Memory Checkpoint Store
//!
//! Process-local checkpoint store for tests and ephemeral deployments.
//! Not crash-safe: every restart is a first start. Values round-trip
//! through the stable encoding so the store observes exactly the same
//! serialization behavior as the durable backend.

use parking_lot::RwLock;
use std::collections::HashMap;

use async_trait::async_trait;
use durable_ingest_domain::{Checkpoint, CheckpointStore, IngestError, PipelineId};

/// Map-backed checkpoint store.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCheckpointStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pipelines with a stored checkpoint.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` when no checkpoint has ever been saved.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load(&self, pipeline_id: &PipelineId) -> Result<Option<Checkpoint>, IngestError> {
        let encoded = self.entries.read().get(pipeline_id.as_str()).cloned();
        encoded
            .map(|raw| {
                Checkpoint::from_json(&raw)
                    .map_err(|e| IngestError::checkpoint_load_failed(e.to_string()))
            })
            .transpose()
    }

    async fn save(
        &self,
        pipeline_id: &PipelineId,
        checkpoint: &Checkpoint,
    ) -> Result<(), IngestError> {
        let encoded = checkpoint
            .to_stable_json()
            .map_err(|e| IngestError::checkpoint_save_failed(e.to_string()))?;
        self.entries
            .write()
            .insert(pipeline_id.as_str().to_owned(), encoded);
        Ok(())
    }
}
