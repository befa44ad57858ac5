// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Resource Set
//!
//! The read-only registry of a pipeline's resources, indexed once at
//! construction.
//!
//! ## Invariants
//!
//! - Resource names are unique within the set; duplicates fail
//!   construction with [`IngestError::DuplicateResource`].
//! - Iteration order is declaration order, always. The event processor
//!   relies on this for its deterministic write/checkpoint transcript.
//!
//! The set is immutable after construction and shared read-only between
//! the event processor and the source.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::Resource;
use crate::error::IngestError;
use crate::value_objects::ResourceName;

/// Immutable, uniquely-named, declaration-ordered resource registry.
#[derive(Debug, Clone)]
pub struct ResourceSet {
    resources: Arc<[Resource]>,
}

impl ResourceSet {
    /// Builds a resource set, enforcing name uniqueness.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidConfiguration`] for an empty set and
    /// [`IngestError::DuplicateResource`] naming the first duplicate
    /// encountered in declaration order.
    pub fn new(resources: Vec<Resource>) -> Result<Self, IngestError> {
        if resources.is_empty() {
            return Err(IngestError::invalid_config(
                "a pipeline requires at least one resource",
            ));
        }

        let mut seen: HashSet<&ResourceName> = HashSet::with_capacity(resources.len());
        for resource in &resources {
            if !seen.insert(resource.name()) {
                return Err(IngestError::duplicate_resource(resource.name().as_str()));
            }
        }

        Ok(Self {
            resources: resources.into(),
        })
    }

    /// Iterates resources in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Returns the resource with the given name, if present.
    pub fn get(&self, name: &ResourceName) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name() == name)
    }

    /// Returns the resource names in declaration order.
    pub fn names(&self) -> Vec<ResourceName> {
        self.resources.iter().map(|r| r.name().clone()).collect()
    }

    /// Number of resources in the set.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` when the set holds no resources.
    ///
    /// Construction rejects empty sets, so this is `false` for any set
    /// built through [`ResourceSet::new`].
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
