// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cancellation Token
//!
//! Lightweight, clone-able cooperative cancellation. The run loop creates
//! a fresh token per connection attempt and hands it to the source; a
//! `stop()` on the pipeline cancels it, and the source is expected to
//! observe the cancellation and release its network handles.
//!
//! Cancellation is one-way and sticky: once cancelled, a token stays
//! cancelled, and every pending and future [`CancellationToken::cancelled`]
//! wait completes immediately.
//!
//! ## Usage
//!
//! ```
//! use durable_ingest::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let token = CancellationToken::new();
//! let worker = token.clone();
//!
//! tokio::spawn(async move {
//!     worker.cancelled().await;
//!     // release handles
//! });
//!
//! token.cancel();
//! # }
//! ```

use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Clone-able cooperative cancellation token.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    /// Shared cancellation flag
    cancelled: Arc<AtomicBool>,
    /// Notification for waiters
    notify: Arc<Notify>,
}

impl CancellationToken {
    /// Creates a new, un-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Cancels this token, waking all waiters. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Checks whether the token is cancelled (non-blocking).
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Waits until the token is cancelled.
    pub async fn cancelled(&self) {
        // Register interest before the second flag check so a cancel that
        // lands between check and await cannot be missed.
        let mut notified = pin!(self.notify.notified());
        if self.is_cancelled() {
            return;
        }
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let token = CancellationToken::new();
        let waiter = token.clone();

        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
            true
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!token.is_cancelled());
        token.cancel();

        let woke = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(woke);
    }

    #[tokio::test]
    async fn test_wait_after_cancel_returns_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel(); // idempotent
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already-cancelled token must not block");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
