// src/trace/tracer.rs
//! Tracer orchestration
//!
//! Binds one start hook and one terminal hook per operation kind,
//! correlates their invocations through an opaque token stashed in the
//! scope's attribute bag, runs the rule engine at the terminal hook,
//! and hands finalized events to the sink. Strictly observational: the
//! instrumented operation is never blocked, slowed, or failed.

use crate::model::{Event, OperationKind};
use crate::rules::{ExemptPolicy, RuleEngine};
use crate::scope::{OperationScope, ScopeAdapter, DEFAULT_ATTR_ALLOW_LIST};
use crate::sink::{EventSink, SinkConfig};
use crate::trace::correlation::CorrelationStore;
use crate::trace::pipeline::LifecyclePipeline;
use crate::utils::{caller_stack, TraceError};
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};
use ulid::Ulid;

/// Attribute key the correlation token travels under
pub const TOKEN_ATTR: &str = "ormsanity:token";

/// Stack-snippet length recorded on each event
const STACK_LINES: usize = 4;

/// Tracer configuration
#[derive(Debug, Clone)]
pub struct TracerConfig {
    /// Label recorded on every event (e.g. the running test's name)
    pub run_label: Option<String>,

    /// Scope attribute names worth copying onto events
    pub attr_allow_list: Vec<String>,

    /// Whether to capture a filtered caller stack at operation start
    pub capture_caller_stack: bool,

    /// Exempt-field policy for the binding-count rule
    pub policy: ExemptPolicy,

    /// Sink configuration
    pub sink: SinkConfig,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            run_label: None,
            attr_allow_list: DEFAULT_ATTR_ALLOW_LIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            capture_caller_stack: true,
            policy: ExemptPolicy::default(),
            sink: SinkConfig::default(),
        }
    }
}

/// Query-lifecycle tracer
pub struct Tracer {
    adapter: ScopeAdapter,
    engine: RuleEngine,
    store: CorrelationStore,
    sink: EventSink,
    errors: Mutex<Vec<TraceError>>,
    run_label: Option<String>,
    capture_caller_stack: bool,
    stats: TracerCounters,
}

#[derive(Default)]
struct TracerCounters {
    started: AtomicU64,
    completed: AtomicU64,
    swept: AtomicU64,
    violations: AtomicU64,
}

/// Point-in-time tracer statistics
#[derive(Debug, Clone, Default)]
pub struct TracerStats {
    /// Operations whose start hook fired
    pub events_started: u64,

    /// Operations finalized through their terminal hook
    pub events_completed: u64,

    /// Operations force-completed by the shutdown sweep
    pub events_swept: u64,

    /// Rule violations recorded
    pub violations: u64,
}

impl Tracer {
    /// Create a tracer from configuration
    pub fn new(config: TracerConfig) -> Self {
        info!(run_label = ?config.run_label, "initializing tracer");
        Self {
            adapter: ScopeAdapter::new(config.attr_allow_list),
            engine: RuleEngine::with_policy(config.policy),
            store: CorrelationStore::new(),
            sink: EventSink::new(config.sink),
            errors: Mutex::new(Vec::new()),
            run_label: config.run_label,
            capture_caller_stack: config.capture_caller_stack,
            stats: TracerCounters::default(),
        }
    }

    /// Register one start and one terminal hook for every operation
    /// kind on the collaborator's pipeline.
    pub fn attach(self: &Arc<Self>, pipeline: &mut dyn LifecyclePipeline) {
        for kind in OperationKind::ALL {
            let tracer = Arc::clone(self);
            pipeline.on_start(
                kind,
                Arc::new(move |scope: &mut dyn OperationScope| {
                    tracer.operation_started(kind, scope)
                }),
            );

            let tracer = Arc::clone(self);
            pipeline.on_terminal(
                kind,
                Arc::new(move |scope: &mut dyn OperationScope| {
                    tracer.operation_completed(scope)
                }),
            );
        }
    }

    /// Start hook: mint a token, attach it to the scope, and record a
    /// fresh event. This is the only point where the caller-supplied
    /// default/non-default field distinction is observable, so the
    /// field snapshot is captured here, before SQL generation.
    pub fn operation_started(&self, kind: OperationKind, scope: &mut dyn OperationScope) {
        let token = Ulid::new().to_string();
        scope.set_attribute(TOKEN_ATTR, Value::String(token.clone()));

        let mut event = Event::new(token.clone(), kind);
        event.table_name = scope.table_name().to_string();
        event.initial_fields = scope.fields();
        event.tx_id = scope.tx_id();
        event.run_label = self.run_label.clone();
        if self.capture_caller_stack {
            event.stack_trace = caller_stack(STACK_LINES);
        }

        let view = self.adapter.capture(scope);
        ScopeAdapter::apply(&view, &mut event);

        debug!(token = %token, kind = kind.as_str(), table = %event.table_name, "operation started");
        self.store.insert(token, event);
        self.stats.started.fetch_add(1, Ordering::Relaxed);
    }

    /// Terminal hook: refresh the event from the scope, evaluate the
    /// rule set, finalize, persist. A second invocation for the same
    /// token is a no-op (nested after-phases can fire the hook twice);
    /// an invocation for a token the store has never seen is a wiring
    /// error, recorded loudly but never raised into the operation.
    pub fn operation_completed(&self, scope: &mut dyn OperationScope) {
        let token = match scope.attribute(TOKEN_ATTR) {
            Some(Value::String(token)) => token,
            other => {
                error!(attr = ?other, "terminal hook fired without a correlation token");
                self.errors.lock().push(TraceError::UnknownToken {
                    token: other.map(|v| v.to_string()),
                });
                return;
            }
        };

        let view = self.adapter.capture(scope);

        let finalized = self.store.update(&token, |event| {
            if event.is_complete {
                return None;
            }
            ScopeAdapter::apply(&view, event);
            let errors = self.engine.evaluate(event, &view);
            event.complete();
            Some((event.clone(), errors))
        });

        match finalized {
            None => {
                error!(token = %token, "terminal hook fired for unknown correlation token");
                self.errors
                    .lock()
                    .push(TraceError::UnknownToken { token: Some(token) });
            }
            Some(None) => {
                debug!(token = %token, "terminal hook repeated for completed event");
            }
            Some(Some((event, errors))) => {
                let violation_count = errors.iter().filter(|e| e.is_violation()).count() as u64;
                self.stats.violations.fetch_add(violation_count, Ordering::Relaxed);
                if !errors.is_empty() {
                    self.errors.lock().extend(errors);
                }
                self.sink.persist(&event);
                self.stats.completed.fetch_add(1, Ordering::Relaxed);
                debug!(token = %token, violations = event.violations.len(), "operation completed");
            }
        }
    }

    /// Shutdown sweep: force-complete and persist every event whose
    /// terminal hook never fired. Rules apply only to normally
    /// terminated operations, so swept events get no evaluation.
    pub fn close(&self) {
        let leftover = self.store.drain();
        let mut swept = 0u64;

        for mut event in leftover {
            if event.is_complete {
                continue;
            }
            event.end_time = Some(Utc::now());
            event.is_complete = true;
            self.sink.persist(&event);
            swept += 1;
        }

        self.stats.swept.fetch_add(swept, Ordering::Relaxed);
        info!(swept, "tracer closed");
    }

    /// Accumulated rule-violation and wiring errors, for assertion by
    /// a test harness.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().iter().map(|e| e.to_string()).collect()
    }

    /// Drain the accumulated errors
    pub fn take_errors(&self) -> Vec<TraceError> {
        std::mem::take(&mut *self.errors.lock())
    }

    /// Clone out every event currently held by the correlation store
    pub fn events(&self) -> Vec<Event> {
        self.store.snapshot()
    }

    /// Path of the sink's log file
    pub fn log_path(&self) -> &Path {
        self.sink.path()
    }

    /// Events lost to sink write failures
    pub fn dropped_writes(&self) -> u64 {
        self.sink.dropped_writes()
    }

    /// Point-in-time statistics
    pub fn stats(&self) -> TracerStats {
        TracerStats {
            events_started: self.stats.started.load(Ordering::Relaxed),
            events_completed: self.stats.completed.load(Ordering::Relaxed),
            events_swept: self.stats.swept.load(Ordering::Relaxed),
            violations: self.stats.violations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldSnapshot, TypeKind};
    use serde_json::json;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    struct TestScope {
        sql: String,
        params: Vec<Value>,
        rows: i64,
        table: String,
        fields: Vec<FieldSnapshot>,
        attrs: BTreeMap<String, Value>,
    }

    impl TestScope {
        fn new(table: &str) -> Self {
            Self {
                sql: String::new(),
                params: Vec::new(),
                rows: 0,
                table: table.to_string(),
                fields: Vec::new(),
                attrs: BTreeMap::new(),
            }
        }
    }

    impl OperationScope for TestScope {
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
            Vec::new()
        }
        fn table_name(&self) -> &str {
            &self.table
        }
        fn fields(&self) -> Vec<FieldSnapshot> {
            self.fields.clone()
        }
        fn attribute(&self, key: &str) -> Option<Value> {
            self.attrs.get(key).cloned()
        }
        fn set_attribute(&mut self, key: &str, value: Value) {
            self.attrs.insert(key.to_string(), value);
        }
    }

    fn test_tracer(dir: &Path) -> Tracer {
        Tracer::new(TracerConfig {
            capture_caller_stack: false,
            sink: SinkConfig {
                dir: dir.to_path_buf(),
                prefix: "trace".to_string(),
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_start_then_terminal() {
        let dir = tempdir().unwrap();
        let tracer = test_tracer(dir.path());

        let mut scope = TestScope::new("accounts");
        tracer.operation_started(OperationKind::Query, &mut scope);
        assert!(scope.attribute(TOKEN_ATTR).is_some());

        // Statement executes between the hooks
        scope.sql = "SELECT * FROM accounts WHERE organization_id = $1".to_string();
        scope.params = vec![json!("acme")];
        scope.rows = 2;
        tracer.operation_completed(&mut scope);

        let events = tracer.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert!(event.is_complete);
        assert_eq!(event.rows_affected, 2);
        assert!(event.violations.is_empty());
        assert!(tracer.errors().is_empty());
        assert_eq!(tracer.stats().events_completed, 1);
    }

    #[test]
    fn test_terminal_hook_is_idempotent() {
        let dir = tempdir().unwrap();
        let tracer = test_tracer(dir.path());

        let mut scope = TestScope::new("accounts");
        tracer.operation_started(OperationKind::Query, &mut scope);
        scope.params = vec![json!(1)];
        tracer.operation_completed(&mut scope);
        tracer.operation_completed(&mut scope);

        // One event, one persisted record, no wiring error
        assert_eq!(tracer.events().len(), 1);
        assert_eq!(tracer.stats().events_completed, 1);
        assert!(tracer.errors().is_empty());

        let contents = std::fs::read_to_string(tracer.log_path()).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn test_unknown_token_is_a_wiring_error() {
        let dir = tempdir().unwrap();
        let tracer = test_tracer(dir.path());

        let mut scope = TestScope::new("accounts");
        tracer.operation_completed(&mut scope);

        let errors = tracer.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unknown correlation token"));
    }

    #[test]
    fn test_violations_accumulate() {
        let dir = tempdir().unwrap();
        let tracer = test_tracer(dir.path());

        // Unfiltered delete
        let mut scope = TestScope::new("accounts");
        tracer.operation_started(OperationKind::Delete, &mut scope);
        scope.sql = "DELETE FROM accounts".to_string();
        tracer.operation_completed(&mut scope);

        let events = tracer.events();
        assert_eq!(events[0].violations, vec!["no_where_delete"]);
        assert_eq!(tracer.errors().len(), 1);
        assert_eq!(tracer.stats().violations, 1);
    }

    #[test]
    fn test_close_sweeps_unfinished_events() {
        let dir = tempdir().unwrap();
        let tracer = test_tracer(dir.path());

        // Terminal hook never fires for this one
        let mut scope = TestScope::new("accounts");
        tracer.operation_started(OperationKind::Update, &mut scope);

        tracer.close();

        assert_eq!(tracer.stats().events_swept, 1);
        let contents = std::fs::read_to_string(tracer.log_path()).unwrap();
        let event: Event = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert!(event.is_complete);
        // No rule evaluation on swept events
        assert!(event.violations.is_empty());
    }

    #[test]
    fn test_initial_fields_captured_at_start() {
        let dir = tempdir().unwrap();
        let tracer = test_tracer(dir.path());

        let mut scope = TestScope::new("accounts");
        scope.fields = vec![
            FieldSnapshot::new("email_address", false, TypeKind::String),
            FieldSnapshot::new("status", true, TypeKind::String),
        ];
        tracer.operation_started(OperationKind::Create, &mut scope);

        // The mapping layer loses the distinction after generation;
        // the event must have kept the start-time snapshot.
        scope.fields = Vec::new();
        scope.sql = "INSERT INTO accounts (email_address) VALUES ($1)".to_string();
        scope.params = vec![json!("a@b.com")];
        tracer.operation_completed(&mut scope);

        let events = tracer.events();
        assert_eq!(events[0].initial_fields.len(), 2);
    }

    #[test]
    fn test_concurrent_operations() {
        use std::thread;

        let dir = tempdir().unwrap();
        let tracer = Arc::new(test_tracer(dir.path()));
        let mut handles = vec![];

        for t in 0..8 {
            let tracer = Arc::clone(&tracer);
            handles.push(thread::spawn(move || {
                for i in 0..25 {
                    let mut scope = TestScope::new("accounts");
                    tracer.operation_started(OperationKind::Query, &mut scope);
                    scope.sql = format!("SELECT * FROM accounts WHERE id = ${}", 1);
                    scope.params = vec![json!(t * 100 + i)];
                    tracer.operation_completed(&mut scope);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = tracer.stats();
        assert_eq!(stats.events_started, 200);
        assert_eq!(stats.events_completed, 200);
        assert!(tracer.errors().is_empty());
    }
}
