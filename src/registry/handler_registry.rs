//! # Handler Registry
//!
//! Mapping from operation name to a pluggable asynchronous handler; the
//! central dispatch point for every externally-supplied operation.
//!
//! Handlers are registered before or during initialization and looked up
//! at call time. Absence is a reportable outcome, not a crash: dispatching
//! an unknown name yields a `HandlerNotFound` outcome carrying the name.
//! The registry imposes no timeout of its own; timeout and backoff belong
//! to whichever collaborator supplies the handler (typically layered via
//! [`crate::retry::with_retry`]).

use crate::constants::triggers;
use crate::results::{Outcome, ResultCode};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Externally-supplied asynchronous operation.
///
/// The handler owns deciding success or failure through the [`Outcome`]
/// it resolves to.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, params: Value) -> Outcome;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    async fn call(&self, params: Value) -> Outcome {
        (self.0)(params).await
    }
}

/// Adapt an async closure into a boxed [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// String-keyed registry of asynchronous handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn Handler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous entry.
    pub fn reg(&self, name: impl Into<String>, handler: Arc<dyn Handler>) {
        let name = name.into();
        debug!(handler = %name, "register handler");
        self.handlers.write().insert(name, handler);
    }

    /// Look up a handler; absence is a first-class `None`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.read().contains_key(name)
    }

    /// Remove and return the handler registered under `name`.
    pub fn take(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.write().remove(name)
    }

    /// Dispatch `name` with `params`.
    ///
    /// An unknown name resolves to a `HandlerNotFound` outcome carrying
    /// the name; nothing is thrown.
    pub async fn call(&self, name: &str, params: Value) -> Outcome {
        match self.get(name) {
            Some(handler) => handler.call(params).await,
            None => Outcome::error(
                ResultCode::HandlerNotFound,
                triggers::HANDLER_CALL,
                json!(name),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
