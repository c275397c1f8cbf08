//! # SDK Core
//!
//! The session context binding every component together: handler and
//! plugin registries, the hook bus, tracker fan-out, one-shot observers,
//! the initialization barrier, and the login/payment pipelines.
//!
//! There is no ambient global state: a [`Core`] is constructed from an
//! [`AppConfig`] and passed explicitly to whatever owns the session.
//! All registration happens before or during initialization; pipeline
//! state (the session user, the memoized barrier outcome) is owned by the
//! core for the process lifetime.

mod login;
mod payment;
mod tracking;
mod validate;

use crate::config::AppConfig;
use crate::constants::{hooks as hook_names, timers, triggers};
use crate::endpoints::{load_endpoints, Endpoints};
use crate::error::CoreResult;
use crate::hooks::{HookBus, HookCallback};
use crate::observer::ObserverRegistry;
use crate::registry::{Handler, HandlerRegistry, PluginFactory, PluginRegistry, TrackerRegistry};
use crate::results::{Outcome, OutcomeSet, ResultCode};
use crate::states::LoginState;
use crate::tracker::Tracker;
use crate::types::User;
use futures::future::{join_all, BoxFuture};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Hook run between authentication and login, over the authenticate
/// payload. A failure aborts the login attempt.
pub type AuthenticateHook = Arc<dyn Fn(&Value) -> CoreResult<()> + Send + Sync>;

/// Hook run after the session user is set. A failure aborts the login
/// attempt's completion.
pub type LoginHook = Arc<dyn Fn(&User) -> CoreResult<()> + Send + Sync>;

/// Asynchronous orchestration core for one SDK session.
pub struct Core {
    app: RwLock<AppConfig>,
    handlers: HandlerRegistry,
    timers: Mutex<HashMap<String, Arc<dyn Handler>>>,
    hooks: HookBus,
    observers: ObserverRegistry,
    trackers: TrackerRegistry,
    plugins: PluginRegistry,
    after_authenticate: RwLock<Vec<AuthenticateHook>>,
    after_login: RwLock<Vec<LoginHook>>,
    pending_inits: Mutex<Vec<BoxFuture<'static, Outcome>>>,
    init_cell: OnceCell<OutcomeSet>,
    user: RwLock<Option<User>>,
    state: RwLock<LoginState>,
}

impl Core {
    pub fn new(app: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            app: RwLock::new(app),
            handlers: HandlerRegistry::new(),
            timers: Mutex::new(HashMap::new()),
            hooks: HookBus::new(),
            observers: ObserverRegistry::new(),
            trackers: TrackerRegistry::new(),
            plugins: PluginRegistry::new(),
            after_authenticate: RwLock::new(Vec::new()),
            after_login: RwLock::new(Vec::new()),
            pending_inits: Mutex::new(Vec::new()),
            init_cell: OnceCell::new(),
            user: RwLock::new(None),
            state: RwLock::new(LoginState::default()),
        })
    }

    /* ---- session state ---- */

    /// Current application configuration snapshot.
    pub fn app(&self) -> AppConfig {
        self.app.read().clone()
    }

    /// Session user; `Some` if and only if login completed successfully.
    pub fn user(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// Authenticated means a user is set.
    pub fn authenticated(&self) -> bool {
        self.user.read().is_some()
    }

    pub fn login_state(&self) -> LoginState {
        *self.state.read()
    }

    pub(crate) fn set_login_state(&self, state: LoginState) {
        *self.state.write() = state;
    }

    pub(crate) fn set_user(&self, user: User) {
        *self.user.write() = Some(user);
    }

    /* ---- registration surface ---- */

    /// Register a handler under an operation name.
    pub fn reg_handler(&self, name: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.reg(name, handler);
    }

    /// Register a payment submission handler under its method trigger.
    pub fn reg_pay(&self, trigger: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.reg(trigger, handler);
    }

    /// Register the payment method selection handler.
    pub fn reg_pay_methods(&self, handler: Arc<dyn Handler>) {
        self.handlers.reg(crate::constants::handlers::PAY_METHODS, handler);
    }

    /// Register a deferred timer handler; it fires at most once.
    pub fn reg_timer(&self, name: impl Into<String>, handler: Arc<dyn Handler>) {
        self.timers.lock().insert(name.into(), handler);
    }

    /// Register an analytics tracker.
    pub fn reg_tracker(&self, name: impl Into<String>, tracker: Arc<dyn Tracker>) {
        self.trackers.reg(name, tracker);
    }

    /// Register a named plugin factory.
    pub fn reg_plugin(&self, name: impl Into<String>, factory: Arc<dyn PluginFactory>) {
        self.plugins.reg_factory(name, factory);
    }

    /// Register an external hook; the name is case-normalized into the
    /// `USER.` namespace.
    pub fn reg_hook(&self, name: &str, callback: HookCallback) {
        self.hooks.reg_user_hook(name, callback);
    }

    /// Publish to an external hook through the `USER.` namespace.
    pub fn publish(&self, name: &str, outcome: &Outcome) {
        self.hooks.publish_user(name, outcome);
    }

    /// Append a post-authenticate hook, run in registration order.
    pub fn after_authenticate(&self, hook: AuthenticateHook) {
        self.after_authenticate.write().push(hook);
    }

    /// Append a post-login hook, run in registration order.
    pub fn after_login(&self, hook: LoginHook) {
        self.after_login.write().push(hook);
    }

    /* ---- component access ---- */

    pub fn hooks(&self) -> &HookBus {
        &self.hooks
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn trackers(&self) -> &TrackerRegistry {
        &self.trackers
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Endpoint list for a named service from the current configuration.
    pub fn endpoints(&self, service: &str) -> Option<Endpoints> {
        load_endpoints(&self.app.read(), service)
    }

    pub(crate) fn after_authenticate_hooks(&self) -> Vec<AuthenticateHook> {
        self.after_authenticate.read().clone()
    }

    pub(crate) fn after_login_hooks(&self) -> Vec<LoginHook> {
        self.after_login.read().clone()
    }

    /* ---- dispatch ---- */

    /// Dispatch a registered handler by name. An unknown name resolves to
    /// a handler-not-found outcome.
    pub async fn call(&self, name: &str, params: Value) -> Outcome {
        self.handlers.call(name, params).await
    }

    /// Synchronous plugin invocation by name.
    pub fn plugin_execute(&self, plugin: &str, params: Value) -> Outcome {
        self.plugins.execute(plugin, params)
    }

    /// Asynchronous plugin invocation by name.
    pub async fn plugin_call(&self, plugin: &str, params: Value) -> Outcome {
        self.plugins.call(plugin, params).await
    }

    /* ---- one-shot observers ---- */

    /// Register a waiter for the next completion of `key`.
    pub fn subscribe(&self, key: &str) -> impl Future<Output = Outcome> + Send + 'static {
        self.observers.subscribe(key)
    }

    /// Deliver `outcome` to every waiter for `key`; `false` when none.
    pub fn complete(&self, key: &str, outcome: Outcome) -> bool {
        self.observers.complete(key, outcome)
    }

    /* ---- initialization barrier ---- */

    /// Append an initialization task. Tasks registered after the first
    /// [`wait_init`] evaluation are never run.
    ///
    /// [`wait_init`]: Core::wait_init
    pub fn initialize<F>(&self, task: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        self.pending_inits.lock().push(Box::pin(task));
    }

    /// Wait for every registered initialization task and aggregate the
    /// results.
    ///
    /// The aggregate is evaluated exactly once per process: concurrent and
    /// repeated callers share the same memoized outcome, and plugin
    /// loading runs exactly once. A task result carrying the reserved
    /// `app.initialize` trigger hot-swaps the stored application
    /// configuration before plugins load.
    pub async fn wait_init(self: &Arc<Self>) -> OutcomeSet {
        self.init_cell
            .get_or_init(|| async {
                let tasks: Vec<BoxFuture<'static, Outcome>> =
                    self.pending_inits.lock().drain(..).collect();
                if tasks.is_empty() {
                    return OutcomeSet::new(triggers::INITIALIZER);
                }

                let results = join_all(tasks).await;
                if let Some(outcome) = results
                    .iter()
                    .find(|outcome| outcome.trigger == triggers::APP_INITIALIZE)
                {
                    match serde_json::from_value::<AppConfig>(outcome.payload.clone()) {
                        Ok(app) => {
                            info!(app = %app.name, "application configuration replaced");
                            *self.app.write() = app;
                        }
                        Err(e) => {
                            warn!(error = %e, "app.initialize payload is not a configuration");
                        }
                    }
                }

                let set = OutcomeSet::collect(triggers::INITIALIZER, results);
                if !set.is_clean() {
                    error!(failures = set.failure, "initialization failure");
                    self.hooks.publish(
                        hook_names::ERR_INITIALIZE,
                        &Outcome::error(
                            ResultCode::Initialize,
                            "core.wait.init",
                            serde_json::to_value(&set.errors).unwrap_or(Value::Null),
                        ),
                    );
                }

                let entries = self.app.read().plugins.clone();
                self.plugins.load(&entries, self, &self.hooks);
                self.plugins.each_after_initialize(&set);
                set
            })
            .await
            .clone()
    }

    /* ---- timers ---- */

    /// Fire a registered timer handler once and discard it.
    pub fn start_timer(&self, timer: &str, options: Value) {
        let Some(handler) = self.timers.lock().remove(timer) else {
            warn!(timer, "timer not found");
            return;
        };
        info!(timer, "timer started");
        let timer = timer.to_string();
        tokio::spawn(async move {
            let outcome = handler.call(options).await;
            debug!(timer = %timer, code = outcome.code.as_i32(), "timer completed");
        });
    }

    /// Dispatch the token refresh handler with the session user.
    ///
    /// A no-op while unauthenticated or when no refresh handler is
    /// registered.
    pub async fn refresh_token(&self, params: Value) -> Option<Outcome> {
        let user = self.user()?;
        let handler = self.handlers.get(timers::TOKEN_REFRESH)?;
        Some(
            handler
                .call(json!({ "params": params, "user": user }))
                .await,
        )
    }
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("app", &self.app.read().name)
            .field("state", &self.login_state())
            .field("authenticated", &self.authenticated())
            .field("handlers", &self.handlers.len())
            .field("plugins", &self.plugins.len())
            .field("trackers", &self.trackers.len())
            .finish()
    }
}
