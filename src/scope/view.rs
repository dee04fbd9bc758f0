// src/scope/view.rs
//! Scope read surface
//!
//! The data-access collaborator exposes one opaque per-call context (the
//! scope). The tracer needs a narrow read surface from it plus a
//! get/set attribute bag for the correlation token; everything else
//! about the scope stays the collaborator's business.

use crate::model::FieldSnapshot;
use serde_json::Value;
use std::collections::BTreeMap;

/// Read/write surface the tracer requires from the collaborator's
/// per-call context.
///
/// Implementations must tolerate being read at any lifecycle phase:
/// fields that are not populated yet (query text before execution, row
/// counts before completion) return their zero/empty value.
pub trait OperationScope {
    /// Rendered SQL text, empty until generated
    fn sql(&self) -> &str;

    /// Bound parameter values in statement order
    fn bound_params(&self) -> &[Value];

    /// Rows affected by the statement, 0 until resolved
    fn rows_affected(&self) -> i64;

    /// Errors reported by the underlying execution so far
    fn driver_errors(&self) -> Vec<String>;

    /// Target table name, empty if not yet known
    fn table_name(&self) -> &str;

    /// Declared per-field state of the in-memory record. Meaningful
    /// only before SQL generation; raw row queries may return nothing.
    fn fields(&self) -> Vec<FieldSnapshot>;

    /// Opaque identity of the enclosing transaction or connection
    fn tx_id(&self) -> Option<u64> {
        None
    }

    /// Read a value from the scope's attribute bag
    fn attribute(&self, key: &str) -> Option<Value>;

    /// Write a value into the scope's attribute bag
    fn set_attribute(&mut self, key: &str, value: Value);
}

/// Owned read-only projection of a scope at one lifecycle phase.
///
/// This is what the rule engine receives: a consistent snapshot taken
/// once per hook invocation, so rules never observe a scope mid-change.
#[derive(Debug, Clone, Default)]
pub struct ScopeView {
    /// Rendered SQL text
    pub query: String,

    /// Bound parameter values in statement order
    pub bound_params: Vec<Value>,

    /// Rows affected
    pub rows_affected: i64,

    /// Driver-reported errors
    pub driver_errors: Vec<String>,

    /// Target table name
    pub table_name: String,

    /// Allow-listed attributes present on the scope
    pub attributes: BTreeMap<String, Value>,

    /// Enclosing transaction/connection identity
    pub tx_id: Option<u64>,
}
