//! # One-Shot Observers
//!
//! Multi-waiter promise registry keyed by string, used to coalesce
//! concurrent requests for the same in-flight asynchronous value: every
//! subscriber registered under a key receives the single eventual
//! [`Outcome`], after which the key is removed.

use crate::results::{Outcome, ResultCode};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::oneshot;
use tracing::debug;

/// Registry of pending one-shot waiters.
///
/// Mutation and lookup never overlap an await point, so a plain mutex is
/// sufficient under cooperative scheduling.
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    waiters: Mutex<HashMap<String, Vec<oneshot::Sender<Outcome>>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new waiter under `key`.
    ///
    /// Multiple subscribers per key are legal; all receive the same
    /// eventual outcome. The returned future resolves when [`complete`]
    /// delivers, or to an [`ResultCode::Unknown`] outcome if the registry
    /// is dropped first.
    ///
    /// [`complete`]: ObserverRegistry::complete
    pub fn subscribe(&self, key: &str) -> impl Future<Output = Outcome> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.waiters
            .lock()
            .entry(key.to_string())
            .or_default()
            .push(tx);
        let key = key.to_string();
        async move {
            rx.await.unwrap_or_else(|_| {
                Outcome::error(ResultCode::Unknown, "observer.dropped", Value::String(key))
            })
        }
    }

    /// Deliver `outcome` to every waiter currently registered under `key`
    /// and remove the key. Returns `false` when no waiters existed.
    pub fn complete(&self, key: &str, outcome: Outcome) -> bool {
        let Some(senders) = self.waiters.lock().remove(key) else {
            return false;
        };
        debug!(key, waiters = senders.len(), "completing observers");
        for sender in senders {
            // A waiter that stopped listening is not an error.
            let _ = sender.send(outcome.clone());
        }
        true
    }

    /// Number of keys with at least one pending waiter.
    pub fn pending(&self) -> usize {
        self.waiters.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn delivers_to_all_waiters_then_cleans_up() {
        let registry = ObserverRegistry::new();
        let first = registry.subscribe("k");
        let second = registry.subscribe("k");
        assert_eq!(registry.pending(), 1);

        let delivered = registry.complete("k", Outcome::success("k", json!(1)));
        assert!(delivered);
        assert_eq!(registry.pending(), 0);

        assert_eq!(first.await.payload, json!(1));
        assert_eq!(second.await.payload, json!(1));
    }

    #[tokio::test]
    async fn complete_without_waiters_is_a_noop() {
        let registry = ObserverRegistry::new();
        assert!(!registry.complete("k", Outcome::success("k", Value::Null)));

        let waiter = registry.subscribe("k");
        assert!(registry.complete("k", Outcome::success("k", Value::Null)));
        waiter.await;
        // key was removed on first completion
        assert!(!registry.complete("k", Outcome::success("k", Value::Null)));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let registry = ObserverRegistry::new();
        let a = registry.subscribe("a");
        let _b = registry.subscribe("b");

        registry.complete("a", Outcome::success("a", json!("a")));
        assert_eq!(a.await.payload, json!("a"));
        assert_eq!(registry.pending(), 1);
    }

    #[tokio::test]
    async fn dropped_registry_resolves_waiters_with_unknown() {
        let registry = ObserverRegistry::new();
        let waiter = registry.subscribe("k");
        drop(registry);

        let outcome = waiter.await;
        assert_eq!(outcome.code, ResultCode::Unknown);
        assert_eq!(outcome.trigger, "observer.dropped");
    }
}
