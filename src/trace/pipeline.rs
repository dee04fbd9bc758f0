// src/trace/pipeline.rs
//! Lifecycle registration surface
//!
//! The data-access collaborator exposes two registration points per
//! operation kind. For create/update/delete the start point fires after
//! the collaborator's begin-transaction step and the terminal point
//! after commit-or-rollback, so the recorded outcome is the resolved
//! one; query/row_query fire around plain statement execution.

use crate::model::OperationKind;
use crate::scope::OperationScope;
use std::sync::Arc;

/// A registered lifecycle callback. Invoked synchronously inside the
/// calling operation's execution path; the tracer introduces no
/// suspension of its own.
pub type Hook = Arc<dyn Fn(&mut dyn OperationScope) + Send + Sync>;

/// Registration points the collaborator must expose
pub trait LifecyclePipeline {
    /// Register a hook at the operation-start point for `kind`
    fn on_start(&mut self, kind: OperationKind, hook: Hook);

    /// Register a hook at the operation-terminal point for `kind`
    fn on_terminal(&mut self, kind: OperationKind, hook: Hook);
}
