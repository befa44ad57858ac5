// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Runtime Primitives
//!
//! Lifecycle building blocks used by the run loop and the event
//! processor: cooperative cancellation, the one-shot disconnect latch,
//! and supervised task spawning.

pub mod cancellation;
pub mod disconnect;
pub mod supervisor;

pub use cancellation::CancellationToken;
pub use disconnect::{DisconnectHandle, DisconnectSignal};
pub use supervisor::{join_supervised, spawn_supervised};
