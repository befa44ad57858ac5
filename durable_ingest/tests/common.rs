// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared fixtures for the runtime integration tests: a scripted
//! in-process source, recording destinations, and handler builders.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use durable_ingest::{
    Checkpoint, CheckpointStore, Destination, EventSource, FnResourceHandler, IngestError,
    MemoryCheckpointStore, Parsed, PipelineId, ProcessInput, ProcessOutput, RawMessage, Record,
    Resource, ResourceHandler, SourceContext, SourceHandle, TableDestination,
};

/// One connection attempt's script: messages to emit, then optionally a
/// cooperative disconnect.
#[derive(Debug, Clone, Default)]
pub struct AttemptScript {
    pub messages: Vec<Value>,
    pub disconnect_after: bool,
}

impl AttemptScript {
    pub fn emit(messages: Vec<Value>) -> Self {
        Self {
            messages,
            disconnect_after: false,
        }
    }

    pub fn emit_then_disconnect(messages: Vec<Value>) -> Self {
        Self {
            messages,
            disconnect_after: true,
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct ScriptedInner {
    scripts: Mutex<VecDeque<AttemptScript>>,
    starts: Mutex<Vec<Option<Checkpoint>>>,
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
}

/// In-process source driven by a per-attempt script.
///
/// Each `start` pops the next script, records the `from_checkpoint` it
/// was handed, and emits the scripted messages (awaiting each delivery,
/// i.e. full backpressure) before optionally resolving the disconnect
/// latch. Attempts beyond the script queue idle until stopped.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    inner: Arc<ScriptedInner>,
}

impl ScriptedSource {
    pub fn new(scripts: Vec<AttemptScript>) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                scripts: Mutex::new(scripts.into()),
                ..Default::default()
            }),
        }
    }

    /// `from_checkpoint` values seen by each `start`, in order.
    pub fn starts(&self) -> Vec<Option<Checkpoint>> {
        self.inner.starts.lock().clone()
    }

    pub fn start_count(&self) -> usize {
        self.inner.start_count.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.inner.stop_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn start(&self, ctx: SourceContext) -> Result<Box<dyn SourceHandle>, IngestError> {
        self.inner.start_count.fetch_add(1, Ordering::SeqCst);
        self.inner.starts.lock().push(ctx.from_checkpoint.clone());

        let script = self
            .inner
            .scripts
            .lock()
            .pop_front()
            .unwrap_or_else(AttemptScript::idle);

        tokio::spawn(async move {
            for message in script.messages {
                match ctx.raw.emit(message) {
                    // Await each delivery: backpressure, and deterministic
                    // write order for the assertions.
                    Ok(delivery) => {
                        let _ = delivery.completed().await;
                    }
                    Err(_) => break,
                }
            }
            if script.disconnect_after {
                ctx.disconnect.resolve(None);
            }
        });

        Ok(Box::new(ScriptedHandle {
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct ScriptedHandle {
    inner: Arc<ScriptedInner>,
}

#[async_trait]
impl SourceHandle for ScriptedHandle {
    async fn stop(self: Box<Self>) -> Result<(), IngestError> {
        self.inner.stop_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Table destination recording its insert batches, optionally failing the
/// n-th write (1-based, counted across the destination's lifetime).
#[derive(Default)]
pub struct RecordingTable {
    pub batches: Mutex<Vec<Vec<Record>>>,
    pub fail_on_write: Option<usize>,
    writes: AtomicUsize,
    log: Option<(String, Arc<Mutex<Vec<String>>>)>,
}

impl RecordingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(write: usize) -> Self {
        Self {
            fail_on_write: Some(write),
            ..Default::default()
        }
    }

    /// Shares a transcript log; each inserted record appends `label:n`.
    pub fn logged(label: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            log: Some((label.to_owned(), log)),
            ..Default::default()
        }
    }

    pub fn insert_count(&self) -> usize {
        self.batches.lock().len()
    }

    /// Flattens all inserted records' `"n"` fields, in write order.
    pub fn sequence(&self) -> Vec<i64> {
        self.batches
            .lock()
            .iter()
            .flatten()
            .filter_map(|r| r.get("n").and_then(Value::as_i64))
            .collect()
    }
}

impl Destination for RecordingTable {
    fn as_table(&self) -> Option<&dyn TableDestination> {
        Some(self)
    }
}

#[async_trait]
impl TableDestination for RecordingTable {
    fn assert_valid_record(&self, record: &Record) -> Result<Record, IngestError> {
        Ok(record.clone())
    }

    async fn insert(&self, records: Vec<Record>) -> Result<(), IngestError> {
        let write = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_write == Some(write) {
            return Err(IngestError::database_error("simulated insert failure"));
        }
        if let Some((label, log)) = &self.log {
            let mut log = log.lock();
            for record in &records {
                log.push(format!(
                    "{}:{}",
                    label,
                    record.get("n").cloned().unwrap_or(Value::Null)
                ));
            }
        }
        self.batches.lock().push(records);
        Ok(())
    }
}

/// Checkpoint store wrapper recording every save, in order.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryCheckpointStore,
    saves: Mutex<Vec<Checkpoint>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `"seq"` field of every saved checkpoint, in save order.
    pub fn save_sequence(&self) -> Vec<i64> {
        self.saves
            .lock()
            .iter()
            .filter_map(|cp| cp.as_map().get("seq").and_then(Value::as_i64))
            .collect()
    }
}

#[async_trait]
impl CheckpointStore for RecordingStore {
    async fn load(&self, pipeline_id: &PipelineId) -> Result<Option<Checkpoint>, IngestError> {
        self.inner.load(pipeline_id).await
    }

    async fn save(
        &self,
        pipeline_id: &PipelineId,
        checkpoint: &Checkpoint,
    ) -> Result<(), IngestError> {
        self.inner.save(pipeline_id, checkpoint).await?;
        self.saves.lock().push(checkpoint.clone());
        Ok(())
    }
}

/// Checkpoint `{"seq": n}`.
pub fn seq_checkpoint(n: i64) -> Checkpoint {
    Checkpoint::from_value(json!({"seq": n})).unwrap()
}

/// Handler: raw `{"n": k}` → one record `{"n": k}` + checkpoint `{"seq": k}`.
pub fn seq_handler() -> Arc<dyn ResourceHandler> {
    Arc::new(FnResourceHandler::new(
        |raw: &RawMessage| Ok(Parsed::One(raw.clone())),
        |input: ProcessInput| {
            let n = input.payload.get("n").and_then(Value::as_i64).unwrap_or(0);
            Ok(Some(ProcessOutput::with_checkpoint(
                vec![input.payload.clone()],
                seq_checkpoint(n),
            )))
        },
    ))
}

/// Handler: raw `{"n": k}` fans out into payloads k, k+1, k+2, each with
/// its own record and checkpoint.
pub fn fanout_handler() -> Arc<dyn ResourceHandler> {
    Arc::new(FnResourceHandler::new(
        |raw: &RawMessage| {
            let base = raw.get("n").and_then(Value::as_i64).unwrap_or(0);
            Ok(Parsed::Many(vec![
                json!({"n": base}),
                json!({"n": base + 1}),
                json!({"n": base + 2}),
            ]))
        },
        |input: ProcessInput| {
            let n = input.payload.get("n").and_then(Value::as_i64).unwrap_or(0);
            Ok(Some(ProcessOutput::with_checkpoint(
                vec![input.payload.clone()],
                seq_checkpoint(n),
            )))
        },
    ))
}

/// Builds the standard single-table resource named `events`.
pub fn table_resource(handler: Arc<dyn ResourceHandler>, table: Arc<RecordingTable>) -> Resource {
    Resource::named("events", handler, table).unwrap()
}

/// Observer collecting every reported error.
pub fn collecting_observer() -> (Arc<Mutex<Vec<IngestError>>>, impl Fn(&IngestError) + Send + Sync)
{
    let errors: Arc<Mutex<Vec<IngestError>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    (errors, move |e: &IngestError| sink.lock().push(e.clone()))
}

/// Installs a test-writer subscriber so `RUST_LOG`-style debugging of a
/// single test run shows the runtime's tracing output. Safe to call from
/// every test; only the first call wins.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Polls `cond` until it holds or the deadline passes.
pub async fn wait_until(what: &str, timeout: Duration, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + timeout;
    while !cond() {
        assert!(
            Instant::now() < deadline,
            "timed out waiting for: {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
