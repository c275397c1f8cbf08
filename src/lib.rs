#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # GameSDK Core
//!
//! Asynchronous orchestration core for game SDK sessions: a fixed
//! sequence of externally-supplied operations (initialization,
//! authentication, login, payment method selection, payment submission,
//! plugin lifecycle hooks, and analytics fan-out) coordinated into
//! deterministic pipelines with consistent error propagation, retry, and
//! one-time-completion guarantees.
//!
//! ## Architecture
//!
//! The core owns the sequencing and error semantics; every concrete
//! backend is an external collaborator registered before use:
//!
//! - **Handlers** supply the authenticate/login/payment operations and
//!   are dispatched by name through the [`registry::HandlerRegistry`].
//! - **Plugins** are instantiated from configuration by named factories
//!   and receive initialization and login lifecycle notifications.
//! - **Trackers** receive every tracked event through a concurrent
//!   fan-out with aggregated outcomes.
//! - **Hooks** mirror every pipeline failure to passive observers, so
//!   propagation is dual-channel: direct outcome plus fire-and-forget
//!   notification.
//!
//! Failures never cross component boundaries as panics; everything flows
//! through [`results::Outcome`] codes.
//!
//! ## Module Organization
//!
//! - [`results`] - Outcome types and the integer error code taxonomy
//! - [`retry`] - Delayed-retry driver for async operations
//! - [`observer`] - Keyed one-shot multi-waiter futures
//! - [`hooks`] - Namespaced publish/subscribe bus
//! - [`queue`] - In-order async work queue
//! - [`registry`] - Handler, plugin and tracker registries
//! - [`core`] - The session context and the login/payment pipelines
//! - [`endpoints`] - Version-range endpoint selection
//! - [`config`] - Application configuration and loading
//! - [`states`] - Login pipeline state definitions
//! - [`tracker`] - Tracking contract and dispatch
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gamesdk_core::config::AppConfig;
//! use gamesdk_core::constants::handlers;
//! use gamesdk_core::core::Core;
//! use gamesdk_core::registry::handler_fn;
//! use gamesdk_core::results::Outcome;
//! use serde_json::json;
//!
//! # async fn example() {
//! let core = Core::new(AppConfig::new("demo"));
//!
//! core.reg_handler(
//!     handlers::AUTHENTICATE,
//!     handler_fn(|params| async move { Outcome::success("auth", params) }),
//! );
//! core.reg_handler(
//!     handlers::LOGIN,
//!     handler_fn(|_| async move {
//!         Outcome::success("login", json!({
//!             "sdk": {"id": "u-1"},
//!             "channel": {"id": "c-1"},
//!             "platform": {"id": "p-1"},
//!             "registered": true
//!         }))
//!     }),
//! );
//!
//! let outcome = core.login(json!({"device": "test"})).await;
//! assert!(outcome.is_success());
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod core;
pub mod endpoints;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod observer;
pub mod queue;
pub mod registry;
pub mod results;
pub mod retry;
pub mod states;
pub mod tracker;
pub mod types;

pub use config::{AppConfig, ConfigManager, PluginEntry};
pub use crate::core::{AuthenticateHook, Core, LoginHook};
pub use endpoints::{Endpoint, Endpoints, Version};
pub use error::{CoreError, CoreResult};
pub use hooks::{HookBus, HookCallback};
pub use observer::ObserverRegistry;
pub use queue::AsyncQueue;
pub use registry::{
    factory_fn, handler_fn, Handler, HandlerRegistry, Plugin, PluginFactory, PluginRegistry,
    TrackerRegistry,
};
pub use results::{Outcome, OutcomeSet, ResultCode};
pub use retry::{with_retry, RetryPolicy};
pub use states::LoginState;
pub use tracker::{BaseTracker, RetryPayload, TrackMethod, TrackPayload, Tracker};
pub use types::{GameOrder, GameRole, User, UserInfo};
