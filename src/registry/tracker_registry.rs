//! # Tracker Registry
//!
//! Named analytics tracker map. Trackers are registered before use and
//! read through snapshots during fan-out; the registry itself never
//! inspects tracked payloads.

use crate::tracker::{RetryPayload, Tracker};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
pub struct TrackerRegistry {
    trackers: RwLock<HashMap<String, Arc<dyn Tracker>>>,
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tracker` under `name`, replacing any previous entry.
    pub fn reg(&self, name: impl Into<String>, tracker: Arc<dyn Tracker>) {
        let name = name.into();
        debug!(tracker = %name, "register tracker");
        self.trackers.write().insert(name, tracker);
    }

    /// Snapshot of all registered trackers.
    pub fn snapshot(&self) -> Vec<(String, Arc<dyn Tracker>)> {
        self.trackers
            .read()
            .iter()
            .map(|(name, tracker)| (name.clone(), tracker.clone()))
            .collect()
    }

    /// Fire every tracker's retry-report hook.
    pub fn retry_all(&self, payload: &RetryPayload) {
        for (name, tracker) in self.snapshot() {
            debug!(tracker = %name, "retry report");
            tracker.retry(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.trackers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.read().is_empty()
    }
}

impl std::fmt::Debug for TrackerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerRegistry")
            .field("trackers", &self.trackers.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
