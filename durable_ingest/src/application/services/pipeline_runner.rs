// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Runner
//!
//! The run loop owning the source lifecycle, and the `{stop, done}`
//! control surface handed to the caller (typically a workflow shell that
//! launches the pipeline as a long-running task).
//!
//! ## Per-Attempt Procedure
//!
//! 1. Load the checkpoint from the store (first iteration only; later
//!    iterations carry the drained processor's in-memory checkpoint).
//! 2. Create a fresh one-shot disconnect latch and a fresh cancellation
//!    token for the attempt.
//! 3. Build a new event processor seeded with the checkpoint, its error
//!    hook wired to the disconnect latch.
//! 4. Start the source. On success, reset the attempt counter and await
//!    the disconnect latch; on failure, fall through to drain.
//! 5. Drain the processor and capture its checkpoint; report a
//!    disconnect cause (unless stop was requested); stop the source
//!    handle best-effort.
//! 6. Exit if stop was requested; otherwise sleep per the reconnect
//!    policy (racing the sleep against `stop()`) and go again.
//!
//! State machine per attempt:
//! `Connecting → Connected → Draining → Cooldown → (exit | Connecting)`.
//!
//! ## Cancellation
//!
//! [`PipelineHandle::stop`] is cooperative and idempotent: it sets the
//! stop flag, cancels the loop and attempt tokens, resolves the
//! disconnect latch, and returns once the loop has fully exited.
//! [`PipelineHandle::done`] resolves when the loop exits for any reason
//! and never rejects on transient failures.
//!
//! ## Error Observer
//!
//! The optional observer sees every non-cooperative termination cause:
//! source start failures, post-disconnect errors, drain errors, and
//! source stop errors. It is never invoked for a user-initiated stop.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use durable_ingest_domain::{
    Checkpoint, CheckpointStore, IngestError, PipelineId, ReconnectPolicy, ResourceSet,
};

use crate::application::services::event_processor::EventProcessor;
use crate::infrastructure::runtime::cancellation::CancellationToken;
use crate::infrastructure::runtime::disconnect::{DisconnectHandle, DisconnectSignal};
use crate::infrastructure::runtime::supervisor::spawn_supervised;
use crate::sources::{EventSource, SourceContext};

/// Observer invoked with every non-cooperative termination cause.
pub type ErrorObserver = Arc<dyn Fn(&IngestError) + Send + Sync>;

/// A fully constructed, not-yet-running pipeline.
///
/// Built by [`crate::PipelineBuilder`]; consumed by [`Pipeline::start`].
pub struct Pipeline {
    id: PipelineId,
    source: Arc<dyn EventSource>,
    resources: ResourceSet,
    store: Arc<dyn CheckpointStore>,
    policy: ReconnectPolicy,
    on_error: Option<ErrorObserver>,
}

impl Pipeline {
    pub(crate) fn new(
        id: PipelineId,
        source: Arc<dyn EventSource>,
        resources: ResourceSet,
        store: Arc<dyn CheckpointStore>,
        policy: ReconnectPolicy,
        on_error: Option<ErrorObserver>,
    ) -> Self {
        Self {
            id,
            source,
            resources,
            store,
            policy,
            on_error,
        }
    }

    /// Returns the pipeline id keying the checkpoint store.
    pub fn id(&self) -> &PipelineId {
        &self.id
    }

    /// Spawns the run loop and returns its control surface.
    pub fn start(self) -> PipelineHandle {
        info!(pipeline = %self.id, resources = self.resources.len(), "pipeline starting");

        let (done_tx, done_rx) = watch::channel(false);
        let shared = Arc::new(RunShared {
            stop_requested: AtomicBool::new(false),
            loop_token: CancellationToken::new(),
            current_attempt: Mutex::new(None),
        });

        let loop_shared = Arc::clone(&shared);
        spawn_supervised("pipeline-run-loop", async move {
            run_loop(self, loop_shared, done_tx).await;
            Ok(())
        });

        PipelineHandle {
            shared,
            done: done_rx,
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("resources", &self.resources.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct AttemptHooks {
    token: CancellationToken,
    disconnect: DisconnectHandle,
}

struct RunShared {
    stop_requested: AtomicBool,
    loop_token: CancellationToken,
    current_attempt: Mutex<Option<AttemptHooks>>,
}

/// Control surface for a running pipeline.
///
/// Clone-able; all clones control the same run loop.
#[derive(Clone)]
pub struct PipelineHandle {
    shared: Arc<RunShared>,
    done: watch::Receiver<bool>,
}

impl PipelineHandle {
    /// Initiates cooperative shutdown and waits for the loop to exit.
    ///
    /// Idempotent: a second call observes the same exit and resolves as
    /// well, without triggering a second source stop.
    pub async fn stop(&self) {
        self.shared.stop_requested.store(true, Ordering::SeqCst);
        self.shared.loop_token.cancel();

        let hooks = self.shared.current_attempt.lock().clone();
        if let Some(hooks) = hooks {
            hooks.token.cancel();
            hooks.disconnect.resolve(None);
        }

        self.done().await;
    }

    /// Resolves when the run loop has exited, for any reason.
    pub async fn done(&self) {
        let mut rx = self.done.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            // A closed channel means the loop task is gone; treat as done.
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Returns `true` once cooperative shutdown has been requested.
    pub fn is_stopping(&self) -> bool {
        self.shared.stop_requested.load(Ordering::SeqCst)
    }
}

fn report(observer: &Option<ErrorObserver>, err: &IngestError) {
    if let Some(cb) = observer {
        cb(err);
    }
}

async fn run_loop(pipeline: Pipeline, shared: Arc<RunShared>, done_tx: watch::Sender<bool>) {
    let Pipeline {
        id,
        source,
        resources,
        store,
        policy,
        on_error,
    } = pipeline;

    let mut attempt: u32 = 0;
    let mut first_iteration = true;
    let mut checkpoint: Option<Checkpoint> = None;

    loop {
        if shared.stop_requested.load(Ordering::SeqCst) {
            break;
        }

        if first_iteration {
            first_iteration = false;
            match store.load(&id).await {
                Ok(loaded) => {
                    checkpoint = loaded;
                    debug!(
                        pipeline = %id,
                        resuming = checkpoint.is_some(),
                        "checkpoint restored"
                    );
                }
                Err(e) => {
                    // Indistinguishable from an evicted entry: start fresh.
                    warn!(pipeline = %id, error = %e, "checkpoint load failed, starting fresh");
                    report(&on_error, &e);
                }
            }
        }

        // -- Connecting --------------------------------------------------
        let disconnect = DisconnectSignal::new();
        let attempt_token = CancellationToken::new();
        *shared.current_attempt.lock() = Some(AttemptHooks {
            token: attempt_token.clone(),
            disconnect: disconnect.handle(),
        });
        // A stop() racing attempt setup must not start another source.
        if shared.stop_requested.load(Ordering::SeqCst) {
            attempt_token.cancel();
            disconnect.handle().resolve(None);
            *shared.current_attempt.lock() = None;
            break;
        }

        let error_hook = disconnect.handle();
        let processor = EventProcessor::new(
            id.clone(),
            resources.clone(),
            Arc::clone(&store),
            checkpoint.clone(),
            Arc::new(move |e| error_hook.resolve(Some(e))),
        );

        // Forward attempt-token abort into the disconnect latch. The
        // watcher exits once the latch resolves, whichever side fired.
        {
            let token = attempt_token.clone();
            let latch = disconnect.handle();
            let resolved = disconnect.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => latch.resolve(None),
                    _ = resolved.wait() => {}
                }
            });
        }

        let ctx = SourceContext {
            resources: resources.names(),
            from_checkpoint: checkpoint.clone(),
            signal: attempt_token.clone(),
            raw: processor.sender(),
            disconnect: disconnect.handle(),
        };

        debug!(pipeline = %id, attempt, "connecting to source");
        let mut handle = None;
        let mut disconnect_cause: Option<IngestError> = None;

        match source.start(ctx).await {
            Ok(h) => {
                info!(pipeline = %id, "source connected");
                attempt = 0;
                handle = Some(h);
                // -- Connected: await the one-shot disconnect latch ------
                disconnect_cause = disconnect.wait().await;
            }
            Err(e) => {
                if !shared.stop_requested.load(Ordering::SeqCst) {
                    warn!(pipeline = %id, error = %e, "source start failed");
                    report(&on_error, &e);
                }
            }
        }

        // -- Draining ----------------------------------------------------
        if let Err(e) = processor.drain().await {
            warn!(pipeline = %id, error = %e, "processor drain failed");
            report(&on_error, &e);
        }
        checkpoint = processor.current_checkpoint();

        if let Some(cause) = disconnect_cause {
            if !shared.stop_requested.load(Ordering::SeqCst) {
                warn!(pipeline = %id, error = %cause, "source disconnected");
                report(&on_error, &cause);
            }
        }

        if let Some(h) = handle {
            if let Err(e) = h.stop().await {
                warn!(pipeline = %id, error = %e, "source stop failed");
                report(&on_error, &e);
            }
        }

        // Release anything still parked on this attempt's primitives.
        disconnect.handle().resolve(None);
        attempt_token.cancel();
        *shared.current_attempt.lock() = None;
        drop(processor);

        // -- Cooldown ----------------------------------------------------
        if shared.stop_requested.load(Ordering::SeqCst) {
            break;
        }

        let delay = policy.delay_for_attempt(attempt);
        debug!(pipeline = %id, attempt, delay_ms = delay.as_millis() as u64, "reconnect backoff");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shared.loop_token.cancelled() => {}
        }
        attempt = attempt.saturating_add(1);
    }

    info!(pipeline = %id, "pipeline stopped");
    let _ = done_tx.send(true);
}
