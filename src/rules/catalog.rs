// src/rules/catalog.rs
//! Canonical rule catalog
//!
//! The checks this project exists for, each encoding one semantic
//! property of generated SQL:
//!
//! - **NoFilterSelect / NoFilterUpdate / NoFilterDelete**: a statement
//!   with zero bound parameters constrains nothing
//! - **ZeroValueInsert**: a bound insert value equal to its type's zero
//!   value is usually an accidental default (booleans exempt)
//! - **BindingCountMismatch**: every caller-set-or-exempt field must
//!   correspond to exactly one bound parameter; the generator silently
//!   omitting a zero-valued filter is the classic gotcha

use crate::model::{Event, FieldSnapshot, OperationKind, TypeKind};
use crate::rules::engine::{Rule, Violation};
use crate::scope::ScopeView;
use serde_json::Value;

/// Which fields count as "should be bound" for the binding-count rule.
///
/// Kept as data, not inline logic: the auto-managed field names are
/// collaborator-specific and tunable per tracer.
#[derive(Debug, Clone)]
pub struct ExemptPolicy {
    /// Fields the mapping layer populates itself (timestamps) and
    /// therefore binds even when the caller left them at the default
    pub auto_managed_fields: Vec<String>,

    /// Declared type kinds with no meaningful "unset" state
    pub exempt_kinds: Vec<TypeKind>,
}

impl ExemptPolicy {
    /// Whether this field should correspond to a bound parameter
    pub fn should_bind(&self, field: &FieldSnapshot) -> bool {
        !field.is_default
            || self.exempt_kinds.contains(&field.kind)
            || self.auto_managed_fields.iter().any(|n| n == &field.name)
    }

    /// How many of the snapshot's fields should be bound
    pub fn expected_binding_count(&self, fields: &[FieldSnapshot]) -> usize {
        fields.iter().filter(|f| self.should_bind(f)).count()
    }
}

impl Default for ExemptPolicy {
    fn default() -> Self {
        Self {
            auto_managed_fields: vec!["created_at".to_string(), "updated_at".to_string()],
            exempt_kinds: vec![TypeKind::Bool],
        }
    }
}

/// Whether a bound value equals the zero value of its own type
/// (empty string, 0, 0.0, false, empty collection, null).
pub fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !*b,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i == 0
            } else if let Some(u) = n.as_u64() {
                u == 0
            } else {
                n.as_f64() == Some(0.0)
            }
        }
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// A read operation should constrain its result set
pub struct NoFilterSelect;

impl Rule for NoFilterSelect {
    fn name(&self) -> &'static str {
        "no_filter_select"
    }

    fn evaluate(&self, event: &Event, view: &ScopeView) -> anyhow::Result<Option<Violation>> {
        if event.operation == OperationKind::Query && view.bound_params.is_empty() {
            return Ok(Some(Violation::new(
                "no_where_clause",
                "no where clause in select",
            )));
        }
        Ok(None)
    }
}

/// An update with no filter mutates every row
pub struct NoFilterUpdate;

impl Rule for NoFilterUpdate {
    fn name(&self) -> &'static str {
        "no_filter_update"
    }

    fn evaluate(&self, event: &Event, view: &ScopeView) -> anyhow::Result<Option<Violation>> {
        if event.operation == OperationKind::Update && view.bound_params.is_empty() {
            return Ok(Some(Violation::new(
                "no_where_update",
                "no where clause in update",
            )));
        }
        Ok(None)
    }
}

/// A delete with no filter removes every row
pub struct NoFilterDelete;

impl Rule for NoFilterDelete {
    fn name(&self) -> &'static str {
        "no_filter_delete"
    }

    fn evaluate(&self, event: &Event, view: &ScopeView) -> anyhow::Result<Option<Violation>> {
        if event.operation == OperationKind::Delete && view.bound_params.is_empty() {
            return Ok(Some(Violation::new(
                "no_where_delete",
                "no where clause in delete",
            )));
        }
        Ok(None)
    }
}

/// An inserted value equal to its type's zero value is usually an
/// accidental default. Booleans are exempt: false is frequently an
/// intentional default.
pub struct ZeroValueInsert;

impl Rule for ZeroValueInsert {
    fn name(&self) -> &'static str {
        "zero_value_insert"
    }

    fn evaluate(&self, event: &Event, view: &ScopeView) -> anyhow::Result<Option<Violation>> {
        if event.operation != OperationKind::Create {
            return Ok(None);
        }

        for (index, value) in view.bound_params.iter().enumerate() {
            if matches!(value, Value::Bool(_)) {
                continue;
            }
            if is_zero_value(value) {
                return Ok(Some(Violation::new(
                    "zero_insert_value",
                    format!("zero value bound at parameter {} of INSERT", index + 1),
                )));
            }
        }
        Ok(None)
    }
}

/// Every caller-set-or-exempt field must correspond to exactly one
/// bound parameter. Fires in both directions: a silently omitted bind
/// and an unexplained extra bind are equally suspicious.
pub struct BindingCountMismatch {
    policy: ExemptPolicy,
}

impl BindingCountMismatch {
    /// Create the rule with the given exempt-field policy
    pub fn new(policy: ExemptPolicy) -> Self {
        Self { policy }
    }
}

impl Rule for BindingCountMismatch {
    fn name(&self) -> &'static str {
        "binding_count_mismatch"
    }

    fn evaluate(&self, event: &Event, view: &ScopeView) -> anyhow::Result<Option<Violation>> {
        // Raw row queries carry no record mapping; nothing to compare.
        if event.initial_fields.is_empty() {
            return Ok(None);
        }

        let expected = self.policy.expected_binding_count(&event.initial_fields);
        let actual = view.bound_params.len();
        if expected != actual {
            return Ok(Some(Violation::new(
                "binding_count_mismatch",
                format!(
                    "{} field(s) should be bound but the statement binds {}",
                    expected, actual
                ),
            )));
        }
        Ok(None)
    }
}

/// The canonical rule set, in evaluation order
pub fn canonical_rules(policy: ExemptPolicy) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(NoFilterSelect),
        Box::new(NoFilterUpdate),
        Box::new(NoFilterDelete),
        Box::new(ZeroValueInsert),
        Box::new(BindingCountMismatch::new(policy)),
    ]
}
