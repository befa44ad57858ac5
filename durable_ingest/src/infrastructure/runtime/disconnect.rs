// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Disconnect Signal
//!
//! A one-shot latched value that ends a connection attempt. Any of the
//! following may resolve it: the source's own disconnect callback, a
//! processing error from the event processor, a user `stop()`, or abort
//! of the attempt's cancellation token.
//!
//! The latch delivers exactly once: the first [`DisconnectHandle::resolve`]
//! wins and every later call is a no-op. The carried value is the optional
//! error cause; a cooperative disconnect carries `None`.

use std::pin::pin;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use durable_ingest_domain::IngestError;

#[derive(Debug)]
enum LatchState {
    Pending,
    Resolved(Option<IngestError>),
}

#[derive(Debug)]
struct LatchInner {
    state: Mutex<LatchState>,
    notify: Notify,
}

/// One-shot latch ending the current connection attempt.
///
/// Clone-able; every clone observes the same resolution. Waiting sides
/// use [`DisconnectSignal::wait`]; resolving sides hold a
/// [`DisconnectHandle`].
#[derive(Clone, Debug)]
pub struct DisconnectSignal {
    inner: Arc<LatchInner>,
}

impl DisconnectSignal {
    /// Creates an unresolved signal.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LatchInner {
                state: Mutex::new(LatchState::Pending),
                notify: Notify::new(),
            }),
        }
    }

    /// Returns a handle that can resolve this signal.
    pub fn handle(&self) -> DisconnectHandle {
        DisconnectHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Returns `true` once the signal has been resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(&*self.inner.state.lock(), LatchState::Resolved(_))
    }

    /// Waits for resolution and returns the disconnect cause, if any.
    ///
    /// Multiple waiters are supported; all observe the same cause.
    pub async fn wait(&self) -> Option<IngestError> {
        let mut notified = pin!(self.inner.notify.notified());
        loop {
            if let LatchState::Resolved(cause) = &*self.inner.state.lock() {
                return cause.clone();
            }
            notified.as_mut().enable();
            if let LatchState::Resolved(cause) = &*self.inner.state.lock() {
                return cause.clone();
            }
            notified.as_mut().await;
            notified.set(self.inner.notify.notified());
        }
    }
}

impl Default for DisconnectSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolving side of a [`DisconnectSignal`].
#[derive(Clone, Debug)]
pub struct DisconnectHandle {
    inner: Arc<LatchInner>,
}

impl DisconnectHandle {
    /// Resolves the signal with an optional error cause.
    ///
    /// The first call wins; later calls (with any cause) are no-ops.
    pub fn resolve(&self, cause: Option<IngestError>) {
        {
            let mut state = self.inner.state.lock();
            if matches!(&*state, LatchState::Resolved(_)) {
                return;
            }
            *state = LatchState::Resolved(cause);
        }
        self.inner.notify.notify_waiters();
    }

    /// Returns `true` once the signal has been resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(&*self.inner.state.lock(), LatchState::Resolved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_resolution_wins() {
        let signal = DisconnectSignal::new();
        let handle = signal.handle();

        handle.resolve(Some(IngestError::connection_lost("socket closed")));
        handle.resolve(None); // no-op
        handle.resolve(Some(IngestError::internal_error("late"))); // no-op

        let cause = signal.wait().await;
        assert!(matches!(cause, Some(IngestError::ConnectionLost(_))));
    }

    #[tokio::test]
    async fn test_wait_before_resolve_wakes() {
        let signal = DisconnectSignal::new();
        let handle = signal.handle();
        let waiter = signal.clone();

        let task = tokio::spawn(async move { waiter.wait().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!signal.is_resolved());

        handle.resolve(None);
        let cause = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(cause.is_none());
    }

    #[tokio::test]
    async fn test_multiple_waiters_observe_same_cause() {
        let signal = DisconnectSignal::new();
        let handle = signal.handle();

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let signal = signal.clone();
                tokio::spawn(async move { signal.wait().await })
            })
            .collect();

        handle.resolve(Some(IngestError::cancelled("stop")));

        for waiter in waiters {
            let cause = tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("waiter should wake")
                .unwrap();
            assert!(matches!(cause, Some(IngestError::Cancelled(_))));
        }
    }

    #[tokio::test]
    async fn test_wait_after_resolve_is_immediate() {
        let signal = DisconnectSignal::new();
        signal.handle().resolve(None);
        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .expect("resolved latch must not block");
    }
}
