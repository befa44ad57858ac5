// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checkpoint Store Configuration
//!
//! Deployment-facing settings for the durable checkpoint store, loadable
//! from a TOML file. Every field has a default, so a partial file (or no
//! file at all) yields a working configuration:
//!
//! ```toml
//! [checkpoint_store]
//! database_path = "var/ingest/checkpoints.db"
//! key_prefix = "prod:checkpoint:"
//! ttl_secs = 31536000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use durable_ingest_domain::IngestError;

use crate::infrastructure::repositories::sqlite_checkpoint_store::{
    SqliteCheckpointStore, StoreOptions, DEFAULT_KEY_PREFIX, DEFAULT_TTL_SECS,
};

fn default_database_path() -> String {
    "ingest_checkpoints.db".to_owned()
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_owned()
}

fn default_ttl_secs() -> Option<u64> {
    Some(DEFAULT_TTL_SECS)
}

/// Settings for the SQLite checkpoint store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointStoreConfig {
    /// Path of the SQLite database file (created when missing).
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Namespace prepended to every pipeline id.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Entry lifetime in seconds. Omitted in TOML means the one-year
    /// default; `None` (expiry disabled) is only reachable
    /// programmatically.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: Option<u64>,
}

impl Default for CheckpointStoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            key_prefix: default_key_prefix(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    checkpoint_store: Option<CheckpointStoreConfig>,
}

impl CheckpointStoreConfig {
    /// Loads the `[checkpoint_store]` section from a TOML file.
    ///
    /// A missing section falls back to defaults; a missing file is an
    /// error (callers decide whether to fall back to
    /// [`CheckpointStoreConfig::default`]).
    pub async fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            IngestError::invalid_config(format!("read config {}: {}", path.display(), e))
        })?;
        let parsed: ConfigFile = toml::from_str(&raw).map_err(|e| {
            IngestError::invalid_config(format!("parse config {}: {}", path.display(), e))
        })?;
        let config = parsed.checkpoint_store.unwrap_or_default();
        debug!(path = %path.display(), "checkpoint store config loaded");
        Ok(config)
    }

    /// Converts to store options.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            key_prefix: self.key_prefix.clone(),
            ttl_secs: self.ttl_secs,
        }
    }

    /// Opens the configured database and builds the store.
    pub async fn open_store(&self) -> Result<SqliteCheckpointStore, IngestError> {
        SqliteCheckpointStore::from_file(&self.database_path, self.store_options()).await
    }
}
