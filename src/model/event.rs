// src/model/event.rs
//! Structured record of one logical database operation
//!
//! One `Event` exists per correlation token. It is created at the start
//! hook, refreshed from the scope at each subsequent hook for the same
//! token, evaluated by the rule engine at the terminal hook, and then
//! finalized and handed to the sink.

use crate::model::field::FieldSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Logical category of a database call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// INSERT
    Create,

    /// SELECT into mapped records
    Query,

    /// Raw row SELECT, no record mapping
    RowQuery,

    /// UPDATE
    Update,

    /// DELETE
    Delete,
}

impl OperationKind {
    /// All operation kinds, in hook-registration order
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Create,
        OperationKind::Query,
        OperationKind::RowQuery,
        OperationKind::Update,
        OperationKind::Delete,
    ];

    /// Stable snake_case name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Query => "query",
            OperationKind::RowQuery => "row_query",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }
}

/// One logical database operation instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Correlation token, unique per operation for the process lifetime
    pub id: String,

    /// Logical category of the operation
    pub operation: OperationKind,

    /// When the start hook fired
    pub start_time: DateTime<Utc>,

    /// When the operation finalized; unset until completion
    pub end_time: Option<DateTime<Utc>>,

    /// Monotonic false-to-true transition, never reverts
    #[serde(rename = "completed")]
    pub is_complete: bool,

    /// Rendered SQL text, captured at the terminal hook
    #[serde(default)]
    pub query: String,

    /// Bound parameter values, in statement order, at the terminal hook
    #[serde(default)]
    pub bound_params: Vec<Value>,

    /// Rows affected; meaningful only once complete
    #[serde(default)]
    pub rows_affected: i64,

    /// Errors reported by the underlying execution
    #[serde(default)]
    pub driver_errors: Vec<String>,

    /// Best-effort target table name
    #[serde(default)]
    pub table_name: String,

    /// Allow-listed framework option flags observed on the scope
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,

    /// Per-field record state at operation start, before SQL generation.
    /// Diagnostic input to the rule engine, never persisted.
    #[serde(skip)]
    pub initial_fields: Vec<FieldSnapshot>,

    /// Tags of the rules this event violated
    #[serde(default)]
    pub violations: Vec<String>,

    /// Identity of the enclosing transaction or connection, if any.
    /// Diagnostics only, never correctness logic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<u64>,

    /// Label of the run (e.g. test name) that issued the operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_label: Option<String>,

    /// Filtered application stack at the call site
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stack_trace: String,
}

impl Event {
    /// Create a fresh event for a newly started operation
    pub fn new(id: impl Into<String>, operation: OperationKind) -> Self {
        Self {
            id: id.into(),
            operation,
            start_time: Utc::now(),
            end_time: None,
            is_complete: false,
            query: String::new(),
            bound_params: Vec::new(),
            rows_affected: 0,
            driver_errors: Vec::new(),
            table_name: String::new(),
            attributes: BTreeMap::new(),
            initial_fields: Vec::new(),
            violations: Vec::new(),
            tx_id: None,
            run_label: None,
            stack_trace: String::new(),
        }
    }

    /// Mark the event complete. Returns `false` if it was already
    /// complete, in which case nothing changes (second completion is a
    /// no-op, not an error).
    pub fn complete(&mut self) -> bool {
        if self.is_complete {
            return false;
        }
        self.end_time = Some(Utc::now());
        self.is_complete = true;
        true
    }
}
