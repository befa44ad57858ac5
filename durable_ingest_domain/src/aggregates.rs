// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Aggregates
//!
//! Consistency boundaries enforcing invariants over their children.
//! [`ResourceSet`] owns a pipeline's resources and guarantees unique
//! names and stable declaration order.

pub mod resource_set;

pub use resource_set::ResourceSet;
