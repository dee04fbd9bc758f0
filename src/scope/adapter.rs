// src/scope/adapter.rs
//! Scope extraction
//!
//! Translates the collaborator's opaque scope into the fields the
//! tracer records: query text, bindings, row count, driver errors,
//! table name, and an allow-listed subset of the scope's attribute bag.
//! Pure extraction; absent fields are left at their zero value.

use crate::model::Event;
use crate::scope::view::{OperationScope, ScopeView};
use once_cell::sync::Lazy;

/// Attribute names worth carrying onto the event. An explicit
/// allow-list, not an unbounded dump of the scope's bag.
pub static DEFAULT_ATTR_ALLOW_LIST: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "orm:insert_option",
        "orm:query_option",
        "orm:delete_option",
        "orm:started_transaction",
        "orm:table_options",
    ]
});

/// Extracts tracer-relevant fields from a scope
#[derive(Debug, Clone)]
pub struct ScopeAdapter {
    allow_list: Vec<String>,
}

impl ScopeAdapter {
    /// Create an adapter with the given attribute allow-list
    pub fn new(allow_list: impl IntoIterator<Item = String>) -> Self {
        Self {
            allow_list: allow_list.into_iter().collect(),
        }
    }

    /// Take a consistent snapshot of the scope at the current phase
    pub fn capture(&self, scope: &dyn OperationScope) -> ScopeView {
        let mut view = ScopeView {
            query: scope.sql().to_string(),
            bound_params: scope.bound_params().to_vec(),
            rows_affected: scope.rows_affected(),
            driver_errors: scope.driver_errors(),
            table_name: scope.table_name().to_string(),
            attributes: Default::default(),
            tx_id: scope.tx_id(),
        };

        for key in &self.allow_list {
            if let Some(value) = scope.attribute(key) {
                view.attributes.insert(key.clone(), value);
            }
        }

        view
    }

    /// Refresh an event from a snapshot. Later phases overwrite earlier
    /// ones; a field the snapshot does not carry yet leaves the event's
    /// existing value alone.
    pub fn apply(view: &ScopeView, event: &mut Event) {
        if !view.query.is_empty() {
            event.query = view.query.clone();
        }
        if !view.bound_params.is_empty() {
            event.bound_params = view.bound_params.clone();
        }
        if !view.table_name.is_empty() {
            event.table_name = view.table_name.clone();
        }
        event.rows_affected = view.rows_affected;
        event.driver_errors = view.driver_errors.clone();
        event.attributes = view.attributes.clone();
        if view.tx_id.is_some() {
            event.tx_id = view.tx_id;
        }
    }
}

impl Default for ScopeAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_ATTR_ALLOW_LIST.iter().map(|s| s.to_string()))
    }
}
