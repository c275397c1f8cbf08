//! End-to-end pipeline tests: initialization barrier, login sequence,
//! payment sequence, and the hook/tracking side channels.

use async_trait::async_trait;
use gamesdk_core::config::{AppConfig, PluginEntry};
use gamesdk_core::constants::{handlers, hooks, timers};
use gamesdk_core::core::Core;
use gamesdk_core::registry::{factory_fn, handler_fn, Plugin};
use gamesdk_core::results::{Outcome, OutcomeSet, ResultCode};
use gamesdk_core::states::LoginState;
use gamesdk_core::tracker::{RetryPayload, TrackPayload, Tracker};
use gamesdk_core::types::User;
use gamesdk_core::{CoreError, CoreResult};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Tracker recording every method it receives.
struct RecordingTracker {
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Tracker for RecordingTracker {
    fn name(&self) -> &str {
        "recording"
    }

    fn retry(&self, _payload: &RetryPayload) {
        self.calls.lock().push("Retry".to_string());
    }

    async fn push_event(&self, payload: TrackPayload) -> Outcome {
        self.calls
            .lock()
            .push(format!("PushEvent:{}", payload.event.unwrap_or_default()));
        Outcome::success("recording", Value::Null)
    }

    async fn user_create(&self, _payload: TrackPayload) -> Outcome {
        self.calls.lock().push("UserCreate".to_string());
        Outcome::success("recording", Value::Null)
    }

    async fn user_login(&self, _payload: TrackPayload) -> Outcome {
        self.calls.lock().push("UserLogin".to_string());
        Outcome::success("recording", Value::Null)
    }
}

fn user_payload(registered: bool) -> Value {
    json!({
        "sdk": {"id": "u-1"},
        "channel": {"id": "c-1"},
        "platform": {"id": "p-1"},
        "registered": registered
    })
}

fn reg_login_handlers(core: &Arc<Core>, registered: bool, auth_calls: Arc<AtomicU32>) {
    core.reg_handler(
        handlers::AUTHENTICATE,
        handler_fn(move |params| {
            auth_calls.fetch_add(1, Ordering::SeqCst);
            async move { Outcome::success("auth.platform", params) }
        }),
    );
    core.reg_handler(
        handlers::LOGIN,
        handler_fn(move |_| async move { Outcome::success("login.backend", user_payload(registered)) }),
    );
}

fn hook_log(core: &Arc<Core>, name: &'static str) -> Arc<Mutex<Vec<Outcome>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    core.hooks().reg_hook(
        name,
        Arc::new(move |outcome: &Outcome| {
            sink.lock().push(outcome.clone());
        }),
    );
    log
}

#[tokio::test]
async fn login_happy_path_for_returning_account() {
    let core = Core::new(AppConfig::new("demo"));
    let auth_calls = Arc::new(AtomicU32::new(0));
    reg_login_handlers(&core, true, auth_calls.clone());

    let tracked = Arc::new(Mutex::new(Vec::new()));
    core.reg_tracker(
        "recording",
        Arc::new(RecordingTracker {
            calls: tracked.clone(),
        }),
    );

    let refreshed = Arc::new(AtomicU32::new(0));
    let refresh_counter = refreshed.clone();
    let refresh_signal = Arc::new(tokio::sync::Notify::new());
    let notify = refresh_signal.clone();
    core.reg_timer(
        timers::TOKEN_REFRESH,
        handler_fn(move |_| {
            let refresh_counter = refresh_counter.clone();
            let notify = notify.clone();
            async move {
                refresh_counter.fetch_add(1, Ordering::SeqCst);
                notify.notify_one();
                Outcome::success("refresh", Value::Null)
            }
        }),
    );

    let outcome = core.login(json!({"device": "test"})).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.trigger, "login.sdk");
    assert!(core.authenticated());
    assert_eq!(core.login_state(), LoginState::LoggedIn);

    let user = core.user().unwrap();
    assert!(user.registered);
    assert_eq!(auth_calls.load(Ordering::SeqCst), 1);

    // authenticate tracking, retry report, then the returning-account event
    assert_eq!(
        *tracked.lock(),
        vec!["PushEvent:login.authenticate", "Retry", "UserLogin"]
    );

    refresh_signal.notified().await;
    assert_eq!(refreshed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn login_tracks_account_creation_for_new_users() {
    let core = Core::new(AppConfig::new("demo"));
    reg_login_handlers(&core, false, Arc::new(AtomicU32::new(0)));

    let tracked = Arc::new(Mutex::new(Vec::new()));
    core.reg_tracker(
        "recording",
        Arc::new(RecordingTracker {
            calls: tracked.clone(),
        }),
    );

    let outcome = core.login(Value::Null).await;
    assert!(outcome.is_success());
    assert!(tracked.lock().contains(&"UserCreate".to_string()));
    assert!(!tracked.lock().contains(&"UserLogin".to_string()));
}

#[tokio::test]
async fn second_login_short_circuits_without_handlers() {
    let core = Core::new(AppConfig::new("demo"));
    let auth_calls = Arc::new(AtomicU32::new(0));
    reg_login_handlers(&core, true, auth_calls.clone());

    assert!(core.login(Value::Null).await.is_success());
    let again = core.login(Value::Null).await;

    assert!(again.is_success());
    assert_eq!(again.trigger, "already.login");
    let cached: User = serde_json::from_value(again.payload).unwrap();
    assert_eq!(cached, core.user().unwrap());
    // no second authenticate dispatch
    assert_eq!(auth_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_authenticate_handler_publishes_and_skips_login() {
    let core = Core::new(AppConfig::new("demo"));
    let login_calls = Arc::new(AtomicU32::new(0));
    let counter = login_calls.clone();
    core.reg_handler(
        handlers::LOGIN,
        handler_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Outcome::success("login.backend", Value::Null) }
        }),
    );
    let errors = hook_log(&core, hooks::ERR_LOGIN);

    let outcome = core.login(Value::Null).await;

    assert_eq!(outcome.code, ResultCode::HandlerNotFound);
    assert_eq!(outcome.trigger, "authenticate.handler");
    assert_eq!(core.login_state(), LoginState::Error);
    assert_eq!(login_calls.load(Ordering::SeqCst), 0);
    assert_eq!(errors.lock().len(), 1);
    assert_eq!(errors.lock()[0].code, ResultCode::HandlerNotFound);
}

#[tokio::test]
async fn initialization_failure_blocks_login() {
    let core = Core::new(AppConfig::new("demo"));
    reg_login_handlers(&core, true, Arc::new(AtomicU32::new(0)));
    core.initialize(async { Outcome::error(ResultCode::Sdk, "storage", Value::Null) });
    let errors = hook_log(&core, hooks::ERR_LOGIN);

    let outcome = core.login(Value::Null).await;

    assert_eq!(outcome.code, ResultCode::Initialize);
    assert_eq!(outcome.trigger, "initializer");
    let aggregate: OutcomeSet = serde_json::from_value(outcome.payload).unwrap();
    assert_eq!(aggregate.failure, 1);
    assert!(!core.authenticated());
    assert_eq!(errors.lock().len(), 1);
}

#[tokio::test]
async fn failed_authenticate_result_is_published_and_returned() {
    let core = Core::new(AppConfig::new("demo"));
    core.reg_handler(
        handlers::AUTHENTICATE,
        handler_fn(|_| async move {
            Outcome::error(ResultCode::Platform, "auth.platform", json!("denied"))
        }),
    );
    core.reg_handler(
        handlers::LOGIN,
        handler_fn(|_| async move { Outcome::success("login.backend", Value::Null) }),
    );
    let errors = hook_log(&core, hooks::ERR_LOGIN);

    let outcome = core.login(Value::Null).await;

    assert_eq!(outcome.code, ResultCode::Platform);
    assert_eq!(errors.lock()[0].trigger, "auth.platform");
    assert!(!core.authenticated());
}

#[tokio::test]
async fn post_authenticate_hook_failure_aborts_with_sdk_error() {
    let core = Core::new(AppConfig::new("demo"));
    let auth_calls = Arc::new(AtomicU32::new(0));
    reg_login_handlers(&core, true, auth_calls);
    core.after_authenticate(Arc::new(|_payload: &Value| -> CoreResult<()> {
        Err(CoreError::Hook("token cache write failed".to_string()))
    }));
    let errors = hook_log(&core, hooks::ERR_LOGIN);

    let outcome = core.login(Value::Null).await;

    assert_eq!(outcome.code, ResultCode::Sdk);
    assert_eq!(outcome.trigger, "authenticate.hook");
    assert!(!core.authenticated());
    assert_eq!(errors.lock().len(), 1);
}

#[tokio::test]
async fn post_login_hook_failure_reports_but_keeps_user() {
    let core = Core::new(AppConfig::new("demo"));
    reg_login_handlers(&core, true, Arc::new(AtomicU32::new(0)));
    core.after_login(Arc::new(|_user: &User| -> CoreResult<()> {
        Err(CoreError::Hook("session persist failed".to_string()))
    }));
    let errors = hook_log(&core, hooks::ERR_LOGIN);

    let outcome = core.login(Value::Null).await;

    assert_eq!(outcome.code, ResultCode::Sdk);
    assert_eq!(outcome.trigger, "login.hook");
    // no rollback across hook boundaries: the session user stays set
    assert!(core.authenticated());
    assert_eq!(errors.lock().len(), 1);
}

#[tokio::test]
async fn plugin_after_login_failure_aborts_attempt() {
    struct FailingPlugin;

    #[async_trait]
    impl Plugin for FailingPlugin {
        fn name(&self) -> &str {
            "failing"
        }

        fn execute(&self, params: Value) -> Outcome {
            Outcome::success("failing", params)
        }

        async fn call(&self, params: Value) -> Outcome {
            Outcome::success("failing", params)
        }

        fn after_login(&self, _user: &User) -> CoreResult<()> {
            Err(CoreError::Plugin("plugin rejected login".to_string()))
        }
    }

    let core = Core::new(AppConfig {
        name: "demo".to_string(),
        plugins: vec![PluginEntry::new("failing")],
        ..AppConfig::default()
    });
    core.reg_plugin(
        "failing",
        factory_fn(|_entry: &PluginEntry, _core: Arc<Core>| {
            Ok(Arc::new(FailingPlugin) as Arc<dyn Plugin>)
        }),
    );
    // a task is needed so the barrier path loads plugins
    core.initialize(async { Outcome::success("boot", Value::Null) });
    reg_login_handlers(&core, true, Arc::new(AtomicU32::new(0)));
    let errors = hook_log(&core, hooks::ERR_LOGIN);

    let outcome = core.login(Value::Null).await;

    assert_eq!(outcome.code, ResultCode::Sdk);
    assert_eq!(outcome.trigger, "login.plugin.hook");
    assert_eq!(errors.lock().len(), 1);
}

#[tokio::test]
async fn malformed_login_payload_is_a_data_error() {
    let core = Core::new(AppConfig::new("demo"));
    core.reg_handler(
        handlers::AUTHENTICATE,
        handler_fn(|params| async move { Outcome::success("auth.platform", params) }),
    );
    core.reg_handler(
        handlers::LOGIN,
        handler_fn(|_| async move { Outcome::success("login.backend", json!("not a user")) }),
    );
    let errors = hook_log(&core, hooks::ERR_LOGIN);

    let outcome = core.login(Value::Null).await;

    assert_eq!(outcome.code, ResultCode::Data);
    assert_eq!(outcome.trigger, "login.payload");
    assert!(!core.authenticated());
    assert_eq!(errors.lock().len(), 1);
}

#[tokio::test]
async fn pay_while_unauthenticated_publishes_and_returns() {
    let core = Core::new(AppConfig::new("demo"));
    let methods_calls = Arc::new(AtomicU32::new(0));
    let counter = methods_calls.clone();
    core.reg_pay_methods(handler_fn(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Outcome::success("pay.wallet", Value::Null) }
    }));
    let errors = hook_log(&core, hooks::ERR_PAY);

    let outcome = core
        .pay(gamesdk_core::GameOrder(json!({"sku": "gold.100"})), Value::Null)
        .await;

    assert_eq!(outcome.code, ResultCode::Unauthenticated);
    assert_eq!(outcome.trigger, "user.null");
    assert_eq!(methods_calls.load(Ordering::SeqCst), 0);
    let published = errors.lock();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].trigger, "pay");
    assert_eq!(published[0].payload["sku"], "gold.100");
}

#[tokio::test]
async fn pay_dispatches_selected_method_and_publishes_payed() {
    let core = Core::new(AppConfig::new("demo"));
    reg_login_handlers(&core, true, Arc::new(AtomicU32::new(0)));
    assert!(core.login(Value::Null).await.is_success());

    core.reg_pay_methods(handler_fn(|params| async move {
        // the trigger names the submission handler to use
        Outcome::success("pay.wallet", json!({"channel": "wallet", "order": params["order"]}))
    }));
    core.reg_pay(
        "pay.wallet",
        handler_fn(|params| async move {
            assert_eq!(params["payment"]["channel"], "wallet");
            Outcome::success("pay.wallet", json!({"receipt": "r-1"}))
        }),
    );
    let payed = hook_log(&core, hooks::PAYED);
    let errors = hook_log(&core, hooks::ERR_PAY);

    let outcome = core
        .pay(gamesdk_core::GameOrder(json!({"sku": "gold.100"})), json!({"zone": 2}))
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.payload["receipt"], "r-1");
    assert!(errors.lock().is_empty());

    let audit = payed.lock();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].payload["response"]["receipt"], "r-1");
    assert_eq!(audit[0].payload["request"]["order"]["sku"], "gold.100");
}

#[tokio::test]
async fn pay_with_unregistered_method_trigger_reports_not_found() {
    let core = Core::new(AppConfig::new("demo"));
    reg_login_handlers(&core, true, Arc::new(AtomicU32::new(0)));
    assert!(core.login(Value::Null).await.is_success());

    core.reg_pay_methods(handler_fn(|_| async move {
        Outcome::success("pay.unknown", Value::Null)
    }));
    let errors = hook_log(&core, hooks::ERR_PAY);

    let outcome = core
        .pay(gamesdk_core::GameOrder(Value::Null), Value::Null)
        .await;

    assert_eq!(outcome.code, ResultCode::HandlerNotFound);
    assert_eq!(outcome.trigger, "pay.methods");
    assert_eq!(errors.lock().len(), 1);
}

#[tokio::test]
async fn pay_failure_from_submission_is_published() {
    let core = Core::new(AppConfig::new("demo"));
    reg_login_handlers(&core, true, Arc::new(AtomicU32::new(0)));
    assert!(core.login(Value::Null).await.is_success());

    core.reg_pay_methods(handler_fn(|_| async move {
        Outcome::success("pay.wallet", Value::Null)
    }));
    core.reg_pay(
        "pay.wallet",
        handler_fn(|_| async move {
            Outcome::error(ResultCode::Channel, "pay.wallet", json!("insufficient funds"))
        }),
    );
    let payed = hook_log(&core, hooks::PAYED);
    let errors = hook_log(&core, hooks::ERR_PAY);

    let outcome = core
        .pay(gamesdk_core::GameOrder(Value::Null), Value::Null)
        .await;

    assert_eq!(outcome.code, ResultCode::Channel);
    assert_eq!(errors.lock().len(), 1);
    assert!(payed.lock().is_empty());
}

#[tokio::test]
async fn call_dispatches_by_name_and_reports_missing_handlers() {
    let core = Core::new(AppConfig::new("demo"));
    core.reg_handler(
        "share.link",
        handler_fn(|params| async move { Outcome::success("share.link", params) }),
    );

    let dispatched = core.call("share.link", json!({"title": "hi"})).await;
    assert!(dispatched.is_success());
    assert_eq!(dispatched.payload["title"], "hi");

    let missing = core.call("share.unknown", Value::Null).await;
    assert_eq!(missing.code, ResultCode::HandlerNotFound);
    assert_eq!(missing.trigger, "sdk.handler.call");
    assert_eq!(missing.payload, json!("share.unknown"));
}

#[tokio::test]
async fn plugins_are_callable_through_the_core_after_init() {
    struct EchoPlugin;

    #[async_trait]
    impl Plugin for EchoPlugin {
        fn name(&self) -> &str {
            "echo"
        }

        fn execute(&self, params: Value) -> Outcome {
            Outcome::success("echo", params)
        }

        async fn call(&self, params: Value) -> Outcome {
            Outcome::success("echo.async", params)
        }
    }

    let core = Core::new(AppConfig {
        name: "demo".to_string(),
        plugins: vec![PluginEntry::new("echo")],
        ..AppConfig::default()
    });
    core.reg_plugin(
        "echo",
        factory_fn(|_entry: &PluginEntry, _core: Arc<Core>| {
            Ok(Arc::new(EchoPlugin) as Arc<dyn Plugin>)
        }),
    );
    core.initialize(async { Outcome::success("boot", Value::Null) });
    core.wait_init().await;

    let executed = core.plugin_execute("echo", json!({"n": 1}));
    assert_eq!(executed.trigger, "echo");
    assert_eq!(executed.payload["n"], 1);

    let called = core.plugin_call("echo", json!({"n": 2})).await;
    assert_eq!(called.trigger, "echo.async");

    let missing = core.plugin_call("ghost", Value::Null).await;
    assert_eq!(missing.code, ResultCode::HandlerNotFound);
}

#[tokio::test]
async fn observers_coalesce_concurrent_waiters() {
    let core = Core::new(AppConfig::new("demo"));
    let first = core.subscribe("profile.fetch");
    let second = core.subscribe("profile.fetch");

    assert!(core.complete("profile.fetch", Outcome::success("profile.fetch", json!({"id": 1}))));
    assert_eq!(first.await.payload["id"], 1);
    assert_eq!(second.await.payload["id"], 1);
    assert!(!core.complete("profile.fetch", Outcome::success("profile.fetch", Value::Null)));
}

#[tokio::test]
async fn validate_text_requires_login_then_dispatches() {
    let core = Core::new(AppConfig::new("demo"));
    core.reg_handler(
        handlers::TEXT,
        handler_fn(|params| async move { Outcome::success("text.checked", params) }),
    );

    let gated = core.validate_text("hello", Value::Null).await;
    assert_eq!(gated.code, ResultCode::Unauthenticated);

    reg_login_handlers(&core, true, Arc::new(AtomicU32::new(0)));
    assert!(core.login(Value::Null).await.is_success());

    let checked = core.validate_text("hello", json!({"strict": true})).await;
    assert!(checked.is_success());
    assert_eq!(checked.payload["content"], "hello");
    assert_eq!(checked.payload["user"]["sdk"]["id"], "u-1");
}

#[tokio::test]
async fn tracking_while_unauthenticated_aggregates_one_error() {
    let core = Core::new(AppConfig::new("demo"));
    core.reg_tracker(
        "recording",
        Arc::new(RecordingTracker {
            calls: Arc::new(Mutex::new(Vec::new())),
        }),
    );

    let set = core.user_event("level.clear", None).await;
    assert_eq!(set.failure, 1);
    assert_eq!(set.errors.len(), 1);
    assert_eq!(set.errors[0].code, ResultCode::Unauthenticated);
    assert_eq!(set.trigger, "core.sdk.UserEvent.unauthenticated");
}

#[tokio::test]
async fn tracking_fans_out_and_synthesizes_missing_methods() {
    let core = Core::new(AppConfig::new("demo"));
    reg_login_handlers(&core, true, Arc::new(AtomicU32::new(0)));
    assert!(core.login(Value::Null).await.is_success());

    // RecordingTracker implements push_event but not user_event
    core.reg_tracker(
        "recording",
        Arc::new(RecordingTracker {
            calls: Arc::new(Mutex::new(Vec::new())),
        }),
    );

    let set = core.user_event("level.clear", Some(json!({"level": 3}))).await;
    assert_eq!(set.trigger, "core.sdk.UserEvent");
    assert_eq!(set.failure, 1);
    assert_eq!(set.errors[0].code, ResultCode::NotFound);
    assert_eq!(set.errors[0].trigger, "recording");
}
