// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SQLite Checkpoint Store
//!
//! Durable reference implementation of the checkpoint store port, backed
//! by a shared SQLite database through sqlx connection pooling.
//!
//! ## Storage Model
//!
//! One table, one row per pipeline:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS ingest_checkpoints (
//!     store_key  TEXT PRIMARY KEY,
//!     checkpoint TEXT NOT NULL,
//!     updated_at INTEGER NOT NULL,
//!     expires_at INTEGER
//! )
//! ```
//!
//! - `store_key` is the configured key prefix plus the pipeline id, so
//!   deployments sharing one database file do not collide.
//! - `checkpoint` holds the stable sorted-key JSON encoding; a load
//!   returns the saved value bit-for-bit.
//! - `save` is a single upsert statement: atomic, and a failed save
//!   leaves the previous row untouched.
//! - `expires_at` implements the TTL (default one year). Expiry exists to
//!   reclaim abandoned pipelines, not for correctness: a load that finds
//!   an expired row reports `None`, indistinguishable from first start.
//!
//! A successfully awaited `save` is visible to a subsequent `load` across
//! process restarts.

use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use async_trait::async_trait;
use durable_ingest_domain::{Checkpoint, CheckpointStore, IngestError, PipelineId};

/// Default TTL: one year.
pub const DEFAULT_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Default per-deployment key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "ingest:checkpoint:";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS ingest_checkpoints (
    store_key  TEXT PRIMARY KEY,
    checkpoint TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    expires_at INTEGER
)";

/// Store tuning: key namespace and entry lifetime.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Prefix prepended to every pipeline id to form the store key.
    pub key_prefix: String,
    /// Entry lifetime in seconds; `None` disables expiry.
    pub ttl_secs: Option<u64>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
            ttl_secs: Some(DEFAULT_TTL_SECS),
        }
    }
}

/// SQLite-backed checkpoint store.
pub struct SqliteCheckpointStore {
    pool: SqlitePool,
    options: StoreOptions,
}

impl SqliteCheckpointStore {
    /// Creates a store over an existing pool, ensuring the table exists.
    pub async fn new(pool: SqlitePool, options: StoreOptions) -> Result<Self, IngestError> {
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| IngestError::database_error(format!("create checkpoint table: {}", e)))?;
        Ok(Self { pool, options })
    }

    /// Opens (creating if needed) a database file and builds the store.
    pub async fn from_file(
        database_path: &str,
        options: StoreOptions,
    ) -> Result<Self, IngestError> {
        let url = format!("sqlite://{}?mode=rwc", database_path);
        let pool = SqlitePool::connect(&url)
            .await
            .map_err(|e| IngestError::database_error(format!("open {}: {}", database_path, e)))?;
        Self::new(pool, options).await
    }

    /// In-memory store for tests.
    ///
    /// Pinned to a single pooled connection: every connection to
    /// `sqlite::memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self, IngestError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| IngestError::database_error(format!("open in-memory store: {}", e)))?;
        Self::new(pool, StoreOptions::default()).await
    }

    fn store_key(&self, pipeline_id: &PipelineId) -> String {
        format!("{}{}", self.options.key_prefix, pipeline_id)
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn load(&self, pipeline_id: &PipelineId) -> Result<Option<Checkpoint>, IngestError> {
        let key = self.store_key(pipeline_id);
        let row = sqlx::query(
            "SELECT checkpoint, expires_at FROM ingest_checkpoints WHERE store_key = ?",
        )
        .bind(&key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IngestError::checkpoint_load_failed(format!("query {}: {}", key, e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: Option<i64> = row
            .try_get("expires_at")
            .map_err(|e| IngestError::checkpoint_load_failed(e.to_string()))?;
        if let Some(expires_at) = expires_at {
            if expires_at <= Utc::now().timestamp() {
                debug!(key = %key, "checkpoint entry expired");
                return Ok(None);
            }
        }

        let encoded: String = row
            .try_get("checkpoint")
            .map_err(|e| IngestError::checkpoint_load_failed(e.to_string()))?;
        Checkpoint::from_json(&encoded)
            .map(Some)
            .map_err(|e| IngestError::checkpoint_load_failed(e.to_string()))
    }

    async fn save(
        &self,
        pipeline_id: &PipelineId,
        checkpoint: &Checkpoint,
    ) -> Result<(), IngestError> {
        let key = self.store_key(pipeline_id);
        let encoded = checkpoint
            .to_stable_json()
            .map_err(|e| IngestError::checkpoint_save_failed(e.to_string()))?;
        let now = Utc::now().timestamp();
        let expires_at = self.options.ttl_secs.map(|ttl| now + ttl as i64);

        sqlx::query(
            "INSERT INTO ingest_checkpoints (store_key, checkpoint, updated_at, expires_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(store_key) DO UPDATE SET
                 checkpoint = excluded.checkpoint,
                 updated_at = excluded.updated_at,
                 expires_at = excluded.expires_at",
        )
        .bind(&key)
        .bind(&encoded)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| IngestError::checkpoint_save_failed(format!("upsert {}: {}", key, e)))?;

        debug!(key = %key, "checkpoint saved");
        Ok(())
    }
}
