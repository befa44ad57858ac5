// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Builder
//!
//! Construction API for pipelines. All build-time invariants are
//! enforced here, synchronously: a pipeline that fails to build can never
//! be started.
//!
//! ## Usage
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use durable_ingest::{PipelineBuilder, MemoryCheckpointStore};
//! # use durable_ingest_domain::{Resource, ReconnectPolicy};
//! # fn example(
//! #     source: impl durable_ingest::EventSource + 'static,
//! #     pageviews: Resource,
//! #     clicks: Resource,
//! # ) -> Result<(), durable_ingest_domain::IngestError> {
//! let pipeline = PipelineBuilder::new("analytics/pageviews")
//!     .source(source)
//!     .resource(pageviews)
//!     .resource(clicks)
//!     .checkpoint_store(Arc::new(MemoryCheckpointStore::new()))
//!     .reconnect_policy(ReconnectPolicy::default())
//!     .on_error(|err| eprintln!("pipeline error: {err}"))
//!     .build()?;
//!
//! let handle = pipeline.start();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use durable_ingest_domain::{
    CheckpointStore, IngestError, PipelineId, ReconnectPolicy, Resource, ResourceSet,
};

use crate::application::services::pipeline_runner::{ErrorObserver, Pipeline};
use crate::sources::EventSource;

/// Builder assembling a [`Pipeline`] from its parts.
pub struct PipelineBuilder {
    pipeline_id: String,
    source: Option<Arc<dyn EventSource>>,
    resources: Vec<Resource>,
    store: Option<Arc<dyn CheckpointStore>>,
    policy: ReconnectPolicy,
    on_error: Option<ErrorObserver>,
}

impl PipelineBuilder {
    /// Starts a builder for the pipeline keyed by `pipeline_id`.
    ///
    /// The id keys the checkpoint store: reuse the same id across process
    /// restarts to resume from the last persisted cursor.
    pub fn new(pipeline_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            source: None,
            resources: Vec::new(),
            store: None,
            policy: ReconnectPolicy::default(),
            on_error: None,
        }
    }

    /// Sets the event source.
    pub fn source(mut self, source: impl EventSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Sets an already-shared event source.
    pub fn source_arc(mut self, source: Arc<dyn EventSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Appends one resource, preserving declaration order.
    pub fn resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Appends several resources, preserving declaration order.
    pub fn resources(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.resources.extend(resources);
        self
    }

    /// Sets the checkpoint store (typically shared across pipelines).
    pub fn checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the default reconnect policy.
    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Installs the error observer.
    pub fn on_error(mut self, observer: impl Fn(&IngestError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(observer));
        self
    }

    /// Validates everything and produces the pipeline.
    ///
    /// # Errors
    /// - [`IngestError::InvalidConfiguration`] for a bad id or policy, a
    ///   missing source or store, or an empty resource list
    /// - [`IngestError::DuplicateResource`] when two resources share a name
    pub fn build(self) -> Result<Pipeline, IngestError> {
        let id = PipelineId::new(self.pipeline_id)?;
        self.policy.validate()?;
        let resources = ResourceSet::new(self.resources)?;
        let source = self
            .source
            .ok_or_else(|| IngestError::invalid_config("pipeline requires a source"))?;
        let store = self
            .store
            .ok_or_else(|| IngestError::invalid_config("pipeline requires a checkpoint store"))?;

        Ok(Pipeline::new(
            id,
            source,
            resources,
            store,
            self.policy,
            self.on_error,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::memory_checkpoint_store::MemoryCheckpointStore;
    use crate::sources::{SourceContext, SourceHandle};
    use async_trait::async_trait;
    use durable_ingest_domain::{Destination, FnResourceHandler, Parsed};

    struct NeverSource;

    #[async_trait]
    impl EventSource for NeverSource {
        async fn start(
            &self,
            _ctx: SourceContext,
        ) -> Result<Box<dyn SourceHandle>, IngestError> {
            Err(IngestError::connect_failed("not used in builder tests"))
        }
    }

    struct NullDestination;
    impl Destination for NullDestination {}

    fn resource(name: &str) -> Resource {
        Resource::named(
            name,
            Arc::new(FnResourceHandler::new(
                |_raw| Ok(Parsed::Nothing),
                |_input| Ok(None),
            )),
            Arc::new(NullDestination),
        )
        .unwrap()
    }

    fn builder() -> PipelineBuilder {
        PipelineBuilder::new("orders")
            .source(NeverSource)
            .checkpoint_store(Arc::new(MemoryCheckpointStore::new()))
    }

    #[test]
    fn test_build_succeeds_with_all_parts() {
        let pipeline = builder().resource(resource("a")).build().unwrap();
        assert_eq!(pipeline.id().as_str(), "orders");
    }

    #[test]
    fn test_duplicate_resource_names_fail_build() {
        let err = builder()
            .resource(resource("foo"))
            .resource(resource("foo"))
            .build()
            .unwrap_err();
        match err {
            IngestError::DuplicateResource(name) => assert_eq!(name, "foo"),
            other => panic!("expected DuplicateResource, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_parts_fail_build() {
        let err = PipelineBuilder::new("orders")
            .resource(resource("a"))
            .checkpoint_store(Arc::new(MemoryCheckpointStore::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfiguration(_)));

        let err = PipelineBuilder::new("orders")
            .source(NeverSource)
            .resource(resource("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfiguration(_)));

        let err = builder().build().unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_invalid_id_and_policy_fail_build() {
        let err = PipelineBuilder::new("bad id!")
            .source(NeverSource)
            .resource(resource("a"))
            .checkpoint_store(Arc::new(MemoryCheckpointStore::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfiguration(_)));

        let err = builder()
            .resource(resource("a"))
            .reconnect_policy(ReconnectPolicy {
                multiplier: 0.0,
                ..ReconnectPolicy::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfiguration(_)));
    }
}
