//! # Application Configuration
//!
//! Configuration consumed by the SDK core: the plugin roster handed to the
//! plugin manager and the per-service endpoint lists handed to the
//! endpoint selector. Everything else an embedding application needs
//! travels opaquely inside plugin entry options.
//!
//! The stored configuration may be hot-replaced while the initialization
//! barrier resolves, when one initialization task's result carries the
//! reserved `app.initialize` trigger.

pub mod loader;

use crate::endpoints::Endpoint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub use loader::ConfigManager;

/// One configured plugin entry.
///
/// Unknown keys are collected into `options` and forwarded verbatim to
/// the plugin factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PluginEntry {
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl PluginEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Application identifier used in tracking payloads and logs
    #[serde(default)]
    pub name: String,
    /// Plugin roster loaded after the initialization barrier resolves
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
    /// Endpoint lists per named service
    #[serde(default)]
    pub services: HashMap<String, Vec<Endpoint>>,
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Enabled plugin entries, in configured order.
    pub fn enabled_plugins(&self) -> impl Iterator<Item = &PluginEntry> {
        self.plugins.iter().filter(|entry| !entry.disabled)
    }
}
