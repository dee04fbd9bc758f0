// src/trace/mod.rs
//! Query-lifecycle tracing
//!
//! - **Tracer**: hook registration, correlation, rule evaluation,
//!   finalization and persistence of events
//! - **CorrelationStore**: coarse-locked token-to-event map
//! - **LifecyclePipeline**: the registration surface the collaborator
//!   exposes
//!
//! # Data flow
//!
//! ```text
//! lifecycle hook fires
//!     │
//!     ├─ start    → mint token → Event (field snapshot) → store
//!     └─ terminal → resolve token → refresh from scope
//!                       → rule engine → finalize → sink → evict at close
//! ```

pub mod correlation;
pub mod pipeline;
pub mod tracer;

pub use correlation::CorrelationStore;
pub use pipeline::{Hook, LifecyclePipeline};
pub use tracer::{Tracer, TracerConfig, TracerStats, TOKEN_ATTR};
