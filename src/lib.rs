// src/lib.rs
//! Ormsanity
//!
//! Query-lifecycle tracer and sanity-rule engine for data-access
//! layers. Intercepts every logical database operation at its start and
//! terminal lifecycle points, assembles one structured event per
//! operation, evaluates a declarative rule set against each completed
//! event, and appends every event to a JSON-lines log.
//!
//! # Architecture
//!
//! - **model**: the event record and declared field metadata
//! - **scope**: the read surface required from the collaborator, plus
//!   extraction into events
//! - **rules**: the rule engine and the canonical rule catalog
//! - **trace**: correlation store, pipeline surface, orchestration
//! - **sink**: append-only JSON-lines persistence
//! - **utils**: errors, caller-stack capture
//!
//! # Quick start
//!
//! ```rust,ignore
//! use ormsanity::{Tracer, TracerConfig};
//! use std::sync::Arc;
//!
//! let tracer = Arc::new(Tracer::new(TracerConfig::default()));
//! tracer.attach(&mut pipeline); // collaborator's registration surface
//!
//! // ... run database operations ...
//!
//! assert!(tracer.errors().is_empty());
//! tracer.close();
//! ```
//!
//! The tracer is strictly observational: rule violations accumulate in
//! the tracer's error collection and the persisted log, and never
//! block, slow, or fail the instrumented operation.

// Public module exports
pub mod model;
pub mod rules;
pub mod scope;
pub mod sink;
pub mod trace;
pub mod utils;

// Re-export commonly used types
pub use model::{Event, FieldSnapshot, OperationKind, TypeKind};
pub use rules::{ExemptPolicy, Rule, RuleEngine, Violation};
pub use scope::{OperationScope, ScopeAdapter, ScopeView};
pub use sink::{EventSink, SinkConfig};
pub use trace::{Hook, LifecyclePipeline, Tracer, TracerConfig, TracerStats, TOKEN_ATTR};
pub use utils::{Result, TraceError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
