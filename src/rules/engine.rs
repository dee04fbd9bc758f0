// src/rules/engine.rs
//! Rule evaluation
//!
//! A rule is a pure check over `(Event, ScopeView)` producing at most
//! one violation. The engine runs every installed rule in order against
//! a completing event; a rule that fails to evaluate is recorded as a
//! tracer-level error and never stops the remaining rules.

use crate::model::Event;
use crate::rules::catalog::{canonical_rules, ExemptPolicy};
use crate::scope::ScopeView;
use crate::utils::TraceError;
use tracing::{debug, warn};

/// A tagged finding produced by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Stable tag appended to the event (`no_where_clause`, ...)
    pub tag: &'static str,

    /// Human-readable description of the finding
    pub message: String,
}

impl Violation {
    /// Create a violation
    pub fn new(tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            tag,
            message: message.into(),
        }
    }
}

/// One declarative correctness check
pub trait Rule: Send + Sync {
    /// Stable rule name, used in error reporting
    fn name(&self) -> &'static str;

    /// Evaluate the rule against a completing event. `Ok(None)` means
    /// the event is clean; `Err` is an evaluation failure, not a
    /// violation.
    fn evaluate(&self, event: &Event, view: &ScopeView) -> anyhow::Result<Option<Violation>>;
}

/// Ordered set of rules evaluated against each completing event
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    /// Create an engine with an explicit rule set
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Create an engine with the canonical rule catalog and the given
    /// exempt-field policy
    pub fn with_policy(policy: ExemptPolicy) -> Self {
        Self::new(canonical_rules(policy))
    }

    /// Number of installed rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the engine has no rules installed
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the full rule set against the event. Violation tags are
    /// appended to the event; the returned errors (violations and
    /// evaluation failures) go to the tracer's process-wide collection.
    /// Evaluation always visits every rule.
    pub fn evaluate(&self, event: &mut Event, view: &ScopeView) -> Vec<TraceError> {
        let mut errors = Vec::new();

        for rule in &self.rules {
            match rule.evaluate(event, view) {
                Ok(Some(violation)) => {
                    debug!(
                        rule = rule.name(),
                        event = %event.id,
                        tag = violation.tag,
                        "rule violation"
                    );
                    event.violations.push(violation.tag.to_string());
                    errors.push(TraceError::RuleViolation {
                        rule: rule.name(),
                        message: violation.message,
                    });
                }
                Ok(None) => {}
                Err(source) => {
                    warn!(rule = rule.name(), event = %event.id, error = %source, "rule evaluation failed");
                    errors.push(TraceError::RuleEval {
                        rule: rule.name(),
                        source,
                    });
                }
            }
        }

        errors
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_policy(ExemptPolicy::default())
    }
}
