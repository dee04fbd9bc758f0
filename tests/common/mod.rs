// tests/common/mod.rs
//! Fake data-access collaborator for integration tests
//!
//! A minimal stand-in for the real ORM: a scope that two lifecycle
//! phases populate, and a pipeline that fires registered hooks around a
//! simulated statement execution.

#![allow(dead_code)]

use ormsanity::{FieldSnapshot, Hook, LifecyclePipeline, OperationKind, OperationScope, TypeKind};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Install a log subscriber honoring `RUST_LOG`. Safe to call from
/// every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Fake per-call context
pub struct FakeScope {
    pub sql: String,
    pub params: Vec<Value>,
    pub rows: i64,
    pub errors: Vec<String>,
    pub table: String,
    pub fields: Vec<FieldSnapshot>,
    pub attrs: BTreeMap<String, Value>,
    pub tx: Option<u64>,
}

impl FakeScope {
    pub fn new(table: &str) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            rows: 0,
            errors: Vec::new(),
            table: table.to_string(),
            fields: Vec::new(),
            attrs: BTreeMap::new(),
            tx: None,
        }
    }

    /// Declare a mapped field of the in-memory record
    pub fn field(mut self, name: &str, is_default: bool, kind: TypeKind) -> Self {
        self.fields.push(FieldSnapshot::new(name, is_default, kind));
        self
    }
}

impl OperationScope for FakeScope {
    fn sql(&self) -> &str {
        &self.sql
    }
    fn bound_params(&self) -> &[Value] {
        &self.params
    }
    fn rows_affected(&self) -> i64 {
        self.rows
    }
    fn driver_errors(&self) -> Vec<String> {
        self.errors.clone()
    }
    fn table_name(&self) -> &str {
        &self.table
    }
    fn fields(&self) -> Vec<FieldSnapshot> {
        self.fields.clone()
    }
    fn tx_id(&self) -> Option<u64> {
        self.tx
    }
    fn attribute(&self, key: &str) -> Option<Value> {
        self.attrs.get(key).cloned()
    }
    fn set_attribute(&mut self, key: &str, value: Value) {
        self.attrs.insert(key.to_string(), value);
    }
}

/// Fake registration surface: one start and one terminal point per
/// operation kind.
#[derive(Default)]
pub struct FakePipeline {
    start: HashMap<OperationKind, Hook>,
    terminal: HashMap<OperationKind, Hook>,
}

impl LifecyclePipeline for FakePipeline {
    fn on_start(&mut self, kind: OperationKind, hook: Hook) {
        self.start.insert(kind, hook);
    }

    fn on_terminal(&mut self, kind: OperationKind, hook: Hook) {
        self.terminal.insert(kind, hook);
    }
}

impl FakePipeline {
    /// Drive one operation through its lifecycle: start hook, simulated
    /// SQL generation and execution, terminal hook.
    pub fn run(
        &self,
        kind: OperationKind,
        scope: &mut FakeScope,
        execute: impl FnOnce(&mut FakeScope),
    ) {
        if let Some(hook) = self.start.get(&kind) {
            hook(scope);
        }
        execute(scope);
        if let Some(hook) = self.terminal.get(&kind) {
            hook(scope);
        }
    }

    /// Fire only the start hook, as when the process dies mid-operation
    pub fn run_abandoned(&self, kind: OperationKind, scope: &mut FakeScope) {
        if let Some(hook) = self.start.get(&kind) {
            hook(scope);
        }
    }

    /// Fire only the terminal hook, as a nested after-phase would
    pub fn fire_terminal(&self, kind: OperationKind, scope: &mut FakeScope) {
        if let Some(hook) = self.terminal.get(&kind) {
            hook(scope);
        }
    }
}
