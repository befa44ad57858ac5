// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Services and Ports
//!
//! Contracts implemented outside the domain layer:
//!
//! - [`resource_handler`]: the parse/process contract a resource supplies
//! - [`destination`]: the write targets (table and stream capabilities)

pub mod destination;
pub mod resource_handler;

pub use destination::{Destination, StreamDestination, TableDestination};
pub use resource_handler::{
    FnResourceHandler, Parsed, Payload, ProcessInput, ProcessOutput, RawMessage, ResourceHandler,
};
