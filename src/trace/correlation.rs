// src/trace/correlation.rs
//! Correlation store
//!
//! Maps correlation tokens to in-flight events. One coarse lock over
//! the whole map: operation volume in the target use (diagnostic/test
//! harness) does not warrant sharding, and whole-map locking rules out
//! torn reads of an event being refreshed by a hook on the same token.

use crate::model::Event;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Concurrency-safe token-to-event map
pub struct CorrelationStore {
    events: Mutex<HashMap<String, Event>>,
}

impl CorrelationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
        }
    }

    /// Insert an event under its token
    pub fn insert(&self, token: impl Into<String>, event: Event) {
        self.events.lock().insert(token.into(), event);
    }

    /// Run a closure against the event for `token` under the lock.
    /// Returns `None` when the token is unknown.
    pub fn update<F, R>(&self, token: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Event) -> R,
    {
        self.events.lock().get_mut(token).map(f)
    }

    /// Clone out the event for `token`
    pub fn get(&self, token: &str) -> Option<Event> {
        self.events.lock().get(token).cloned()
    }

    /// Remove and return the event for `token`
    pub fn remove(&self, token: &str) -> Option<Event> {
        self.events.lock().remove(token)
    }

    /// Remove and return every event. Used by the shutdown sweep.
    pub fn drain(&self) -> Vec<Event> {
        self.events.lock().drain().map(|(_, e)| e).collect()
    }

    /// Clone out every event, in no particular order
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().values().cloned().collect()
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Default for CorrelationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OperationKind;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_insert_update_remove() {
        let store = CorrelationStore::new();
        store.insert("tok_a", Event::new("tok_a", OperationKind::Create));

        let completed = store.update("tok_a", |e| e.complete());
        assert_eq!(completed, Some(true));

        assert!(store.update("tok_missing", |_| ()).is_none());

        let event = store.remove("tok_a").unwrap();
        assert!(event.is_complete);
        assert!(store.is_empty());
    }

    #[test]
    fn test_drain_empties_the_store() {
        let store = CorrelationStore::new();
        for i in 0..4 {
            let id = format!("tok_{}", i);
            store.insert(id.clone(), Event::new(id, OperationKind::Query));
        }

        let drained = store.drain();
        assert_eq!(drained.len(), 4);
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_independent_tokens() {
        let store = Arc::new(CorrelationStore::new());
        let mut handles = vec![];

        // 8 threads, each owning its own tokens, as independent
        // operations would.
        for t in 0..8 {
            let s = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    let token = format!("tok_{}_{}", t, i);
                    s.insert(token.clone(), Event::new(token.clone(), OperationKind::Update));
                    s.update(&token, |e| e.complete());
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 400);
        assert!(store.snapshot().iter().all(|e| e.is_complete));
    }
}
