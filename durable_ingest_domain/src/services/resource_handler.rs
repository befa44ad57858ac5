// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Resource Handler Contract
//!
//! The parse/process pair every resource supplies. `parse` is the primary
//! filter: it inspects a raw provider message and returns the payloads
//! relevant to this resource (often none). `process` turns one payload
//! into the records to write and, optionally, the checkpoint that becomes
//! durable once those records land.
//!
//! ## Contract
//!
//! - `parse(raw)` returns [`Parsed`]: nothing, one payload, or many.
//!   Returning [`Parsed::Nothing`] for irrelevant messages is expected,
//!   not an error.
//! - `process(input)` returns `Ok(None)` to skip (no write, no checkpoint
//!   advance) or `Ok(Some(output))` with the records in write order.
//! - An empty `records` list causes no write and no checkpoint advance,
//!   even when a checkpoint is supplied: a checkpoint is only ever
//!   persisted behind the records that produced it.
//! - `received_at` is the runtime's wall-clock observation at parse time.
//!
//! Handlers are shared read-only across the processor and the source and
//! must be `Send + Sync`. Both steps are synchronous transforms; I/O
//! belongs in destinations and sources.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::IngestError;
use crate::value_objects::Checkpoint;

/// Opaque provider-defined message delivered by a source.
pub type RawMessage = Value;

/// Resource-typed value produced by `parse`.
pub type Payload = Value;

/// Result of parsing one raw message for one resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// The message is not relevant to this resource.
    Nothing,
    /// One payload.
    One(Payload),
    /// Multiple payloads, in order.
    Many(Vec<Payload>),
}

impl Parsed {
    /// Normalizes to a payload list (`Nothing` becomes empty).
    pub fn into_payloads(self) -> Vec<Payload> {
        match self {
            Parsed::Nothing => Vec::new(),
            Parsed::One(payload) => vec![payload],
            Parsed::Many(payloads) => payloads,
        }
    }

    /// Returns `true` when no payloads were produced.
    pub fn is_empty(&self) -> bool {
        match self {
            Parsed::Nothing => true,
            Parsed::One(_) => false,
            Parsed::Many(payloads) => payloads.is_empty(),
        }
    }
}

impl From<Option<Payload>> for Parsed {
    fn from(value: Option<Payload>) -> Self {
        match value {
            Some(payload) => Parsed::One(payload),
            None => Parsed::Nothing,
        }
    }
}

impl From<Vec<Payload>> for Parsed {
    fn from(payloads: Vec<Payload>) -> Self {
        Parsed::Many(payloads)
    }
}

/// Input to a resource's `process` step.
#[derive(Debug, Clone)]
pub struct ProcessInput {
    /// The payload produced by `parse`.
    pub payload: Payload,
    /// Wall-clock observation taken when the raw message was parsed.
    pub received_at: DateTime<Utc>,
}

/// Output of a resource's `process` step.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Records to write, in order. Each element must be a JSON object.
    pub records: Vec<Value>,
    /// Checkpoint to persist once every record above has been written.
    pub checkpoint: Option<Checkpoint>,
}

impl ProcessOutput {
    /// Convenience constructor for records without a checkpoint.
    pub fn records(records: Vec<Value>) -> Self {
        Self {
            records,
            checkpoint: None,
        }
    }

    /// Convenience constructor for records with a checkpoint.
    pub fn with_checkpoint(records: Vec<Value>, checkpoint: Checkpoint) -> Self {
        Self {
            records,
            checkpoint: Some(checkpoint),
        }
    }
}

/// The parse/process contract supplied per resource.
pub trait ResourceHandler: Send + Sync {
    /// Extracts this resource's payloads from a raw message.
    fn parse(&self, raw: &RawMessage) -> Result<Parsed, IngestError>;

    /// Turns one payload into records and an optional checkpoint.
    fn process(&self, input: ProcessInput) -> Result<Option<ProcessOutput>, IngestError>;
}

/// Closure-backed [`ResourceHandler`].
///
/// Lets integrators and tests define a resource without a dedicated type:
///
/// ```
/// use durable_ingest_domain::{FnResourceHandler, Parsed, ProcessOutput};
/// use serde_json::json;
///
/// let handler = FnResourceHandler::new(
///     |raw| Ok(Parsed::One(raw.clone())),
///     |input| Ok(Some(ProcessOutput::records(vec![json!({"payload": input.payload})]))),
/// );
/// ```
pub struct FnResourceHandler<P, F> {
    parse_fn: P,
    process_fn: F,
}

impl<P, F> FnResourceHandler<P, F>
where
    P: Fn(&RawMessage) -> Result<Parsed, IngestError> + Send + Sync,
    F: Fn(ProcessInput) -> Result<Option<ProcessOutput>, IngestError> + Send + Sync,
{
    /// Wraps a parse closure and a process closure into a handler.
    pub fn new(parse_fn: P, process_fn: F) -> Self {
        Self {
            parse_fn,
            process_fn,
        }
    }
}

impl<P, F> ResourceHandler for FnResourceHandler<P, F>
where
    P: Fn(&RawMessage) -> Result<Parsed, IngestError> + Send + Sync,
    F: Fn(ProcessInput) -> Result<Option<ProcessOutput>, IngestError> + Send + Sync,
{
    fn parse(&self, raw: &RawMessage) -> Result<Parsed, IngestError> {
        (self.parse_fn)(raw)
    }

    fn process(&self, input: ProcessInput) -> Result<Option<ProcessOutput>, IngestError> {
        (self.process_fn)(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parsed_normalization() {
        assert!(Parsed::Nothing.into_payloads().is_empty());
        assert_eq!(Parsed::One(json!(1)).into_payloads(), vec![json!(1)]);
        assert_eq!(
            Parsed::Many(vec![json!(1), json!(2)]).into_payloads(),
            vec![json!(1), json!(2)]
        );
        assert!(Parsed::Many(Vec::new()).is_empty());
    }

    #[test]
    fn test_parsed_from_option() {
        assert_eq!(Parsed::from(None), Parsed::Nothing);
        assert_eq!(Parsed::from(Some(json!("p"))), Parsed::One(json!("p")));
    }

    #[test]
    fn test_fn_handler_routes_closures() {
        let handler = FnResourceHandler::new(
            |raw: &RawMessage| Ok(Parsed::One(raw.clone())),
            |input: ProcessInput| Ok(Some(ProcessOutput::records(vec![input.payload]))),
        );

        let parsed = handler.parse(&json!({"k": 1})).unwrap();
        assert_eq!(parsed, Parsed::One(json!({"k": 1})));

        let output = handler
            .process(ProcessInput {
                payload: json!({"k": 1}),
                received_at: Utc::now(),
            })
            .unwrap()
            .unwrap();
        assert_eq!(output.records, vec![json!({"k": 1})]);
        assert!(output.checkpoint.is_none());
    }
}
