//! # Hook Bus
//!
//! Namespaced publish/subscribe registry for fire-and-forget notifications.
//! Hooks are best-effort: publishing to a name with no subscribers is a
//! silent no-op, and the publish path never reports back to the publisher.
//!
//! Externally registered hooks live under the case-normalized `USER.`
//! namespace; the core publishes its own error classes under the reserved
//! `SYS.error.*` names.

use crate::constants::hooks as hook_names;
use crate::results::Outcome;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Result-consuming hook callback.
pub type HookCallback = Arc<dyn Fn(&Outcome) + Send + Sync>;

/// Registry of named hook callback lists.
#[derive(Default)]
pub struct HookBus {
    hooks: RwLock<HashMap<String, Vec<HookCallback>>>,
    last_published_at: RwLock<Option<DateTime<Utc>>>,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized external hook name: lower-cased and `USER.`-prefixed.
    pub fn user_name(name: &str) -> String {
        format!("{}{}", hook_names::USER_PREFIX, name.to_lowercase())
    }

    /// Register an external hook under the `USER.` namespace.
    pub fn reg_user_hook(&self, name: &str, callback: HookCallback) {
        self.reg_hook(&Self::user_name(name), callback);
    }

    /// Publish to an external hook under the `USER.` namespace.
    pub fn publish_user(&self, name: &str, outcome: &Outcome) {
        self.publish(&Self::user_name(name), outcome);
    }

    /// Register a callback under an exact (reserved or internal) name.
    ///
    /// Callbacks are never removed; they fire for every publication in
    /// registration order.
    pub fn reg_hook(&self, name: &str, callback: HookCallback) {
        info!(hook = name, "register hook");
        self.hooks
            .write()
            .entry(name.to_string())
            .or_default()
            .push(callback);
    }

    /// Invoke every callback registered for exactly `name`, synchronously,
    /// in registration order. An absent name is a no-op.
    pub fn publish(&self, name: &str, outcome: &Outcome) {
        let callbacks = {
            let hooks = self.hooks.read();
            match hooks.get(name) {
                Some(list) => list.clone(),
                None => {
                    debug!(hook = name, "publish with no subscribers");
                    return;
                }
            }
        };
        *self.last_published_at.write() = Some(Utc::now());
        for callback in callbacks {
            callback(outcome);
        }
    }

    /// Number of callbacks registered under `name`.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.hooks.read().get(name).map_or(0, Vec::len)
    }

    /// Timestamp of the most recent delivered publication, if any.
    pub fn last_published_at(&self) -> Option<DateTime<Utc>> {
        *self.last_published_at.read()
    }
}

impl std::fmt::Debug for HookBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookBus")
            .field("hooks", &self.hooks.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
