// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Task Supervision
//!
//! Supervised spawning for the runtime's background tasks (run loop,
//! processor worker). Wraps `tokio::spawn` so that every task logs its
//! start and outcome and every join surfaces panics and cancellations as
//! typed errors. No spawn-and-forget: callers hold the returned handle.

use tokio::task::JoinHandle;
use tracing::{debug, error};

use durable_ingest_domain::IngestError;

/// Result alias for supervised runtime tasks.
pub type TaskResult<T> = Result<T, IngestError>;

/// Spawns a named task whose outcome is always logged.
///
/// The returned handle must be awaited (directly or via
/// [`join_supervised`]); dropping it detaches the task but the outcome is
/// still logged.
pub fn spawn_supervised<F, T>(name: &'static str, fut: F) -> JoinHandle<TaskResult<T>>
where
    F: std::future::Future<Output = TaskResult<T>> + Send + 'static,
    T: Send + 'static,
{
    debug!(task = name, "task starting");

    tokio::spawn(async move {
        let result = fut.await;

        match &result {
            Ok(_) => debug!(task = name, "task completed"),
            Err(e) => error!(task = name, error = %e, "task failed"),
        }

        result
    })
}

/// Awaits a supervised task, converting panics and cancellations into
/// [`IngestError`] values.
pub async fn join_supervised<T>(handle: JoinHandle<TaskResult<T>>) -> TaskResult<T> {
    match handle.await {
        Ok(task_result) => task_result,
        Err(e) if e.is_panic() => Err(IngestError::internal_error(format!(
            "task panicked: {}",
            e
        ))),
        Err(e) if e.is_cancelled() => Err(IngestError::cancelled("task cancelled")),
        Err(e) => Err(IngestError::internal_error(format!(
            "task join failed: {}",
            e
        ))),
    }
}
