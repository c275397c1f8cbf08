//! # Plugin Registry
//!
//! Loads, instantiates, and lifecycle-notifies plugins declared in the
//! application configuration, via named factories.
//!
//! Loading is strictly non-fatal: a missing factory or a failed
//! construction publishes a plugin error hook and skips that entry; the
//! remaining plugin loads proceed. Once loaded, a plugin lives for the
//! process lifetime and is owned exclusively by this registry.

use crate::config::PluginEntry;
use crate::constants::hooks as hook_names;
use crate::core::Core;
use crate::error::CoreResult;
use crate::hooks::HookBus;
use crate::results::{Outcome, OutcomeSet, ResultCode};
use crate::types::User;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Externally supplied, dynamically loaded extension object participating
/// in initialization and login lifecycle notifications.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Synchronous plugin invocation.
    fn execute(&self, params: Value) -> Outcome;

    /// Asynchronous plugin invocation.
    async fn call(&self, params: Value) -> Outcome;

    /// Fired once, after the initialization barrier resolves.
    fn after_initialize(&self, _results: &OutcomeSet) {}

    /// Fired after every successful login. A failure here aborts that
    /// specific login attempt with an SDK error outcome.
    fn after_login(&self, _user: &User) -> CoreResult<()> {
        Ok(())
    }
}

/// Named constructor resolved from configuration.
///
/// Construction failures are contained: a factory returning `Err` is
/// published as a plugin error hook, and that plugin is simply absent
/// from the active set.
pub trait PluginFactory: Send + Sync {
    fn create(&self, entry: &PluginEntry, core: Arc<Core>) -> CoreResult<Arc<dyn Plugin>>;
}

struct FnFactory<F>(F);

impl<F> PluginFactory for FnFactory<F>
where
    F: Fn(&PluginEntry, Arc<Core>) -> CoreResult<Arc<dyn Plugin>> + Send + Sync,
{
    fn create(&self, entry: &PluginEntry, core: Arc<Core>) -> CoreResult<Arc<dyn Plugin>> {
        (self.0)(entry, core)
    }
}

/// Adapt a closure into a boxed [`PluginFactory`].
pub fn factory_fn<F>(f: F) -> Arc<dyn PluginFactory>
where
    F: Fn(&PluginEntry, Arc<Core>) -> CoreResult<Arc<dyn Plugin>> + Send + Sync + 'static,
{
    Arc::new(FnFactory(f))
}

/// Registry of plugin factories and the active plugin set.
#[derive(Default)]
pub struct PluginRegistry {
    factories: RwLock<std::collections::HashMap<String, Arc<dyn PluginFactory>>>,
    active: RwLock<Vec<Arc<dyn Plugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named factory, replacing any previous entry.
    pub fn reg_factory(&self, name: impl Into<String>, factory: Arc<dyn PluginFactory>) {
        let name = name.into();
        debug!(plugin = %name, "register plugin factory");
        self.factories.write().insert(name, factory);
    }

    /// Instantiate every configured, non-disabled plugin entry.
    ///
    /// Failures are published to the plugin error hook and skipped; they
    /// never abort the remaining loads.
    pub fn load(&self, entries: &[PluginEntry], core: &Arc<Core>, hooks: &HookBus) {
        for entry in entries.iter().filter(|entry| !entry.disabled) {
            let factory = self.factories.read().get(&entry.name).cloned();
            let Some(factory) = factory else {
                error!(plugin = %entry.name, "plugin loader is missing");
                hooks.publish(
                    hook_names::ERR_PLUGIN,
                    &Outcome::error(
                        ResultCode::Initialize,
                        "plugin.missing",
                        json!(entry.name),
                    ),
                );
                continue;
            };
            match factory.create(entry, Arc::clone(core)) {
                Ok(plugin) => {
                    info!(plugin = %entry.name, "plugin loaded");
                    self.active.write().push(plugin);
                }
                Err(e) => {
                    error!(plugin = %entry.name, error = %e, "load plugin failed");
                    hooks.publish(
                        hook_names::ERR_PLUGIN,
                        &Outcome::error(
                            ResultCode::Initialize,
                            "plugin.load",
                            json!(e.to_string()),
                        ),
                    );
                }
            }
        }
    }

    /// Synchronous invocation of the first active plugin named `name`.
    pub fn execute(&self, name: &str, params: Value) -> Outcome {
        match self.find(name) {
            Some(plugin) => plugin.execute(params),
            None => Outcome::error(
                ResultCode::HandlerNotFound,
                "plugin.execute.notfound",
                json!(format!("plugin {name} not found or disabled")),
            ),
        }
    }

    /// Asynchronous invocation of the first active plugin named `name`.
    pub async fn call(&self, name: &str, params: Value) -> Outcome {
        match self.find(name) {
            Some(plugin) => plugin.call(params).await,
            None => Outcome::error(
                ResultCode::HandlerNotFound,
                "plugin.call.notfound",
                json!(format!("plugin {name} not found or disabled")),
            ),
        }
    }

    fn find(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.active
            .read()
            .iter()
            .find(|plugin| plugin.name() == name)
            .cloned()
    }

    /// Snapshot of the active plugin set, in load order.
    pub fn snapshot(&self) -> Vec<Arc<dyn Plugin>> {
        self.active.read().clone()
    }

    /// Notify every active plugin that initialization completed.
    pub fn each_after_initialize(&self, results: &OutcomeSet) {
        for plugin in self.snapshot() {
            plugin.after_initialize(results);
        }
    }

    pub fn len(&self) -> usize {
        self.active.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.read().is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("factories", &self.factories.read().keys().collect::<Vec<_>>())
            .field("active", &self.len())
            .finish()
    }
}
