// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Resource
//!
//! A named routing unit declared once per pipeline. A resource owns its
//! stable name, the parse/process handler that turns raw messages into
//! records, and the destination those records are written to.
//!
//! Resources are declared in order; the event processor visits them in
//! declaration order for every raw message, and the resource set rejects
//! duplicate names at pipeline construction.

use std::fmt;
use std::sync::Arc;

use crate::error::IngestError;
use crate::services::destination::Destination;
use crate::services::resource_handler::ResourceHandler;
use crate::value_objects::ResourceName;

/// A named routing unit: handler plus destination.
///
/// Resources are identified by name. The handler and destination are
/// shared read-only between the event processor and the source, so both
/// are held behind `Arc`.
#[derive(Clone)]
pub struct Resource {
    name: ResourceName,
    handler: Arc<dyn ResourceHandler>,
    destination: Arc<dyn Destination>,
}

impl Resource {
    /// Creates a resource from its parts.
    pub fn new(
        name: ResourceName,
        handler: Arc<dyn ResourceHandler>,
        destination: Arc<dyn Destination>,
    ) -> Self {
        Self {
            name,
            handler,
            destination,
        }
    }

    /// Creates a resource, validating the name string in one step.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidConfiguration`] when the name fails
    /// validation.
    pub fn named(
        name: impl Into<String>,
        handler: Arc<dyn ResourceHandler>,
        destination: Arc<dyn Destination>,
    ) -> Result<Self, IngestError> {
        Ok(Self::new(ResourceName::new(name)?, handler, destination))
    }

    /// Returns the resource's name.
    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    /// Returns the parse/process handler.
    pub fn handler(&self) -> &Arc<dyn ResourceHandler> {
        &self.handler
    }

    /// Returns the destination this resource writes to.
    pub fn destination(&self) -> &Arc<dyn Destination> {
        &self.destination
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
