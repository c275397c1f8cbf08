//! # Component Registries
//!
//! Registration and dispatch for the pluggable collaborators the core
//! orchestrates: named asynchronous handlers, configuration-declared
//! plugins, and analytics trackers.

pub mod handler_registry;
pub mod plugin_registry;
pub mod tracker_registry;

pub use handler_registry::{handler_fn, Handler, HandlerRegistry};
pub use plugin_registry::{factory_fn, Plugin, PluginFactory, PluginRegistry};
pub use tracker_registry::TrackerRegistry;
