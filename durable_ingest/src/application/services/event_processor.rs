// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Processor
//!
//! Serializes the full pipeline for one connection attempt: every raw
//! message flows through parse → process → write → checkpoint on a single
//! worker task, in the order the messages were emitted.
//!
//! ## Serialization Contract
//!
//! One worker drains an unbounded FIFO queue:
//!
//! - records from raw message *k* are fully written before records from
//!   message *k+1* begin,
//! - the checkpoint for message *k* is durable before records from
//!   message *k+1* are written,
//! - [`EventProcessor::drain`] enqueues a sentinel and awaits it, which
//!   by FIFO order awaits the entire previously enqueued tail.
//!
//! Within one raw message, resources act in declaration order and
//! payloads in the order `parse` returned them; no interleaving.
//!
//! ## Write-Then-Checkpoint
//!
//! A checkpoint is persisted only after every record that produced it has
//! been written, and the in-memory snapshot advances only after the save
//! resolves. An empty record list causes no write and no checkpoint
//! advance, even when the process output carries a checkpoint.
//!
//! ## Failure Handling
//!
//! Any error from parse, process, write, or save is handed to the
//! injected processing-error hook (which the run loop wires to the
//! disconnect latch) and settles that message's completion handle as
//! errored. The worker then continues with subsequent queued messages;
//! at-least-once delivery is preserved because the checkpoint never moved
//! past the failure.
//!
//! ## Backpressure
//!
//! [`RawSender::emit`] enqueues synchronously and returns a
//! [`RawDelivery`] completion handle. A source that awaits each delivery
//! before emitting the next gets full backpressure; a source that drops
//! the handles gets fire-and-forget enqueueing. Either way the FIFO order
//! is the order `emit` returned.

use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use durable_ingest_domain::{
    Checkpoint, CheckpointStore, IngestError, PipelineId, ProcessInput, RawMessage, Resource,
    ResourceSet,
};

use crate::application::services::sink_writer::SinkWriter;
use crate::infrastructure::runtime::supervisor::{spawn_supervised, TaskResult};

/// Hook invoked with every processing failure.
pub type ProcessingErrorHook = Arc<dyn Fn(IngestError) + Send + Sync>;

enum Job {
    Message {
        raw: RawMessage,
        completion: oneshot::Sender<Result<(), IngestError>>,
    },
    Drain {
        done: oneshot::Sender<()>,
    },
    Stop,
}

/// Serialized per-connection event processor.
///
/// Created fresh per connection attempt, seeded with the most recent
/// persisted checkpoint; dropped after drain when the attempt ends.
pub struct EventProcessor {
    jobs: mpsc::UnboundedSender<Job>,
    checkpoint: Arc<RwLock<Option<Checkpoint>>>,
    worker: Option<JoinHandle<TaskResult<()>>>,
}

struct WorkerState {
    pipeline_id: PipelineId,
    resources: ResourceSet,
    store: Arc<dyn CheckpointStore>,
    writer: SinkWriter,
    checkpoint: Arc<RwLock<Option<Checkpoint>>>,
    on_error: ProcessingErrorHook,
}

impl EventProcessor {
    /// Spawns the worker, seeded with the checkpoint to resume from.
    pub fn new(
        pipeline_id: PipelineId,
        resources: ResourceSet,
        store: Arc<dyn CheckpointStore>,
        initial_checkpoint: Option<Checkpoint>,
        on_error: ProcessingErrorHook,
    ) -> Self {
        let checkpoint = Arc::new(RwLock::new(initial_checkpoint));
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();

        let state = WorkerState {
            pipeline_id,
            resources,
            store,
            writer: SinkWriter::new(),
            checkpoint: Arc::clone(&checkpoint),
            on_error,
        };

        let worker = spawn_supervised("event-processor", async move {
            while let Some(job) = queue.recv().await {
                match job {
                    Job::Message { raw, completion } => {
                        let result = handle_message(&state, raw).await;
                        if let Err(e) = &result {
                            warn!(pipeline = %state.pipeline_id, error = %e, "message processing failed");
                            (state.on_error)(e.clone());
                        }
                        // The emitter may have dropped its delivery handle.
                        let _ = completion.send(result);
                    }
                    Job::Drain { done } => {
                        let _ = done.send(());
                    }
                    Job::Stop => break,
                }
            }
            Ok(())
        });

        Self {
            jobs,
            checkpoint,
            worker: Some(worker),
        }
    }

    /// Returns a clone-able sender for raw provider messages.
    pub fn sender(&self) -> RawSender {
        RawSender {
            jobs: self.jobs.clone(),
        }
    }

    /// Awaits completion of all previously accepted messages.
    pub async fn drain(&self) -> Result<(), IngestError> {
        let (done, ack) = oneshot::channel();
        self.jobs
            .send(Job::Drain { done })
            .map_err(|_| IngestError::internal_error("event processor worker stopped"))?;
        ack.await
            .map_err(|_| IngestError::internal_error("event processor worker stopped"))
    }

    /// Snapshot of the most recently persisted checkpoint.
    pub fn current_checkpoint(&self) -> Option<Checkpoint> {
        self.checkpoint.read().clone()
    }
}

impl Drop for EventProcessor {
    fn drop(&mut self) {
        let _ = self.jobs.send(Job::Stop);
        // The worker exits on its own after the sentinel; the handle is
        // dropped detached, with its outcome still logged by supervision.
        self.worker.take();
    }
}

/// Runs the per-message algorithm: for each resource in declaration
/// order, parse, then for each payload process, write, and checkpoint.
async fn handle_message(state: &WorkerState, raw: RawMessage) -> Result<(), IngestError> {
    for resource in state.resources.iter() {
        handle_resource(state, resource, &raw).await?;
    }
    Ok(())
}

async fn handle_resource(
    state: &WorkerState,
    resource: &Resource,
    raw: &RawMessage,
) -> Result<(), IngestError> {
    let parsed = resource.handler().parse(raw)?;
    let received_at = Utc::now();
    let payloads = parsed.into_payloads();

    for payload in payloads {
        let output = resource.handler().process(ProcessInput {
            payload,
            received_at,
        })?;

        let Some(output) = output else {
            continue;
        };
        if output.records.is_empty() {
            // No write means no checkpoint advance, even if one was offered.
            continue;
        }

        for value in &output.records {
            if !value.is_object() {
                return Err(IngestError::invalid_process_output(
                    resource.name().as_str(),
                    "records must be plain keyed objects",
                ));
            }
        }

        state
            .writer
            .write(resource.name(), resource.destination().as_ref(), &output.records)
            .await?;

        if let Some(checkpoint) = output.checkpoint {
            state
                .store
                .save(&state.pipeline_id, &checkpoint)
                .await
                .map_err(|e| match e {
                    already @ IngestError::CheckpointSaveFailed(_) => already,
                    other => IngestError::checkpoint_save_failed(other.to_string()),
                })?;
            *state.checkpoint.write() = Some(checkpoint);
            debug!(pipeline = %state.pipeline_id, resource = %resource.name(), "checkpoint advanced");
        }
    }

    Ok(())
}

/// Clone-able enqueue side of the processor's FIFO queue.
#[derive(Clone)]
pub struct RawSender {
    jobs: mpsc::UnboundedSender<Job>,
}

impl RawSender {
    /// Enqueues one raw message, returning its completion handle.
    ///
    /// The enqueue itself is synchronous; FIFO order is the order `emit`
    /// returned. Awaiting the returned [`RawDelivery`] before the next
    /// `emit` is the source's backpressure option, never a requirement.
    ///
    /// # Errors
    /// Returns [`IngestError::Cancelled`] when the processor has stopped.
    pub fn emit(&self, raw: RawMessage) -> Result<RawDelivery, IngestError> {
        let (completion, delivery) = oneshot::channel();
        self.jobs
            .send(Job::Message { raw, completion })
            .map_err(|_| IngestError::cancelled("event processor stopped"))?;
        Ok(RawDelivery {
            completion: delivery,
        })
    }
}

/// Completion handle for one emitted raw message.
///
/// Resolves once the message has fully flowed through
/// parse → process → write → checkpoint, with the processing outcome.
pub struct RawDelivery {
    completion: oneshot::Receiver<Result<(), IngestError>>,
}

impl RawDelivery {
    /// Awaits the message's processing outcome.
    pub async fn completed(self) -> Result<(), IngestError> {
        match self.completion.await {
            Ok(result) => result,
            Err(_) => Err(IngestError::cancelled("event processor stopped")),
        }
    }
}
