// src/utils/errors.rs
//! Crate error types
//!
//! Errors fall into three buckets with very different handling:
//!
//! - **Rule findings**: recorded in the tracer's error collection,
//!   never propagated into the instrumented operation.
//! - **Wiring errors**: a terminal hook fired for a token the store has
//!   never seen. Indicates a registration bug, surfaced loudly.
//! - **Sink failures**: swallowed at the call site, counted for
//!   operational visibility.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, TraceError>;

/// Tracer error taxonomy
#[derive(Debug, Error)]
pub enum TraceError {
    /// A rule flagged a suspicious statement. The tag is already
    /// appended to the event; this carries the human-readable finding.
    #[error("rule {rule}: {message}")]
    RuleViolation {
        /// Name of the rule that fired
        rule: &'static str,

        /// Human-readable description of the finding
        message: String,
    },

    /// A rule failed to evaluate. Not a violation; the remaining rules
    /// still run.
    #[error("rule {rule} failed to evaluate: {source}")]
    RuleEval {
        /// Name of the rule that failed
        rule: &'static str,

        /// Underlying evaluation error
        #[source]
        source: anyhow::Error,
    },

    /// A terminal hook fired for a correlation token the store has no
    /// event for. Registration bug in the pipeline wiring.
    #[error("terminal hook fired for unknown correlation token {token:?}")]
    UnknownToken {
        /// The token carried by the scope, if any was attached at all
        token: Option<String>,
    },

    /// Sink I/O or serialization failure
    #[error("sink write failed: {0}")]
    SinkFailed(String),
}

impl TraceError {
    /// Whether this error represents a rule finding (as opposed to an
    /// infrastructure failure).
    pub fn is_violation(&self) -> bool {
        matches!(self, TraceError::RuleViolation { .. })
    }
}
