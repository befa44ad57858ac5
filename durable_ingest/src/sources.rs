// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Source Contract
//!
//! The adapter boundary between the runtime and an external event
//! provider (websocket feed, realtime subscription). Implementers supply
//! an [`EventSource`]; the run loop starts it once per connection attempt
//! and stops the returned handle before backing off.
//!
//! ## Contract
//!
//! `start` receives a [`SourceContext`] and either returns a live
//! [`SourceHandle`] or fails (driving a backoff-and-retry iteration).
//! A started source:
//!
//! - emits raw provider messages through [`SourceContext::raw`]
//!   ([`crate::RawSender::emit`]); awaiting each returned
//!   [`crate::RawDelivery`] is the optional backpressure mechanism,
//! - reports a lost connection through [`SourceContext::disconnect`]
//!   (idempotent; the first resolution wins),
//! - observes [`SourceContext::signal`] and releases its network handles
//!   when the token is cancelled,
//! - may use [`SourceContext::from_checkpoint`] to request provider-side
//!   replay when the provider supports it; `None` means first start (or
//!   an expired store entry, which is indistinguishable),
//! - is responsible for detecting silent connections via its own
//!   keepalive and reporting them as disconnects. The runtime imposes no
//!   timeout of its own.
//!
//! This contract lives in the runtime crate (not the domain) because the
//! context carries runtime primitives: the cancellation token and the
//! processor's queue sender.

use async_trait::async_trait;

use durable_ingest_domain::{Checkpoint, IngestError, ResourceName};

use crate::application::services::event_processor::RawSender;
use crate::infrastructure::runtime::cancellation::CancellationToken;
use crate::infrastructure::runtime::disconnect::DisconnectHandle;

/// Everything a source needs for one connection attempt.
pub struct SourceContext {
    /// Resource names, in declaration order.
    pub resources: Vec<ResourceName>,
    /// Cursor to resume from, or `None` on first start.
    pub from_checkpoint: Option<Checkpoint>,
    /// Cancellation token for this attempt; cancelled on `stop()`.
    pub signal: CancellationToken,
    /// Enqueues raw messages into the serialized processor.
    pub raw: RawSender,
    /// Resolves the attempt's disconnect latch. First call wins.
    pub disconnect: DisconnectHandle,
}

/// External event provider adapter.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Connects and begins emitting raw messages.
    ///
    /// # Errors
    /// A failed start is reported to the pipeline's error observer and
    /// retried under the reconnect policy.
    async fn start(&self, ctx: SourceContext) -> Result<Box<dyn SourceHandle>, IngestError>;
}

/// Live connection handle, created per attempt.
#[async_trait]
pub trait SourceHandle: Send {
    /// Releases the connection. Called exactly once, before backoff.
    ///
    /// # Errors
    /// Stop errors are reported to the error observer; they never block
    /// the run loop's exit.
    async fn stop(self: Box<Self>) -> Result<(), IngestError>;
}
