//! Login pipeline: authenticate, login, post-hooks, tracking.
//!
//! The sequence is a plain async routine with early returns; every
//! failure is reported twice: directly to the caller as the returned
//! outcome, and as a fire-and-forget publication on the login error hook.
//! Nothing here retries: retry belongs to the supplied handlers.

use super::Core;
use crate::constants::{events, handlers, hooks as hook_names, timers, triggers};
use crate::results::{Outcome, ResultCode};
use crate::states::LoginState;
use crate::tracker::RetryPayload;
use crate::types::User;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

impl Core {
    /// Run the login sequence.
    ///
    /// An already logged-in session short-circuits with the cached user
    /// under the `already.login` trigger, without invoking any handler.
    /// Otherwise: wait for the initialization barrier, dispatch the
    /// authenticate handler, run the post-authenticate hooks, dispatch
    /// the login handler, set the session user, run the post-login hooks,
    /// notify trackers and plugins, and arm the token refresh timer.
    pub async fn login(self: &Arc<Self>, params: Value) -> Outcome {
        if let Some(user) = self.user() {
            return Outcome::success(triggers::ALREADY_LOGIN, user.to_value());
        }

        let initializations = self.wait_init().await;
        if !initializations.is_clean() {
            error!(failures = initializations.failure, "login blocked by initialization failure");
            let failed = Outcome::error(
                ResultCode::Initialize,
                initializations.trigger.clone(),
                serde_json::to_value(&initializations).unwrap_or(Value::Null),
            );
            self.hooks().publish(hook_names::ERR_LOGIN, &failed);
            self.set_login_state(LoginState::Error);
            return failed;
        }

        self.set_login_state(LoginState::Authenticating);
        let Some(authenticate) = self.handlers().get(handlers::AUTHENTICATE) else {
            return self.login_failed(Outcome::error(
                ResultCode::HandlerNotFound,
                "authenticate.handler",
                json!("handler not found"),
            ));
        };
        let authenticated = authenticate.call(params.clone()).await;
        if !authenticated.is_success() {
            return self.login_failed(authenticated);
        }
        info!("authenticate success");
        debug!(payload = %authenticated.payload, "authenticate payload");
        self.set_login_state(LoginState::Authenticated);

        for hook in self.after_authenticate_hooks() {
            if let Err(e) = hook(&authenticated.payload) {
                return self.login_failed(Outcome::error(
                    ResultCode::Sdk,
                    "authenticate.hook",
                    json!(e.to_string()),
                ));
            }
        }
        let _ = self
            .push_event(events::LOGIN_AUTHENTICATE, Some(authenticated.payload.clone()))
            .await;

        self.set_login_state(LoginState::LoggingIn);
        let Some(login) = self.handlers().get(handlers::LOGIN) else {
            return self.login_failed(Outcome::error(
                ResultCode::HandlerNotFound,
                "login.handler",
                json!("handler not found"),
            ));
        };
        let logged = login.call(authenticated.payload).await;
        if !logged.is_success() {
            return self.login_failed(logged);
        }

        let user: User = match serde_json::from_value(logged.payload.clone()) {
            Ok(user) => user,
            Err(e) => {
                return self.login_failed(Outcome::error(
                    ResultCode::Data,
                    "login.payload",
                    json!(e.to_string()),
                ));
            }
        };
        info!("login success");
        debug!(payload = %logged.payload, "login payload");
        self.set_user(user.clone());
        self.set_login_state(LoginState::LoggedIn);

        // The user stays set when a post-login hook fails: tracking and
        // hook invocations already performed are not rolled back.
        for hook in self.after_login_hooks() {
            if let Err(e) = hook(&user) {
                return self.login_report(Outcome::error(
                    ResultCode::Sdk,
                    "login.hook",
                    json!(e.to_string()),
                ));
            }
        }

        self.trackers().retry_all(&RetryPayload {
            user: Some(user.clone()),
            role: None,
        });

        for plugin in self.plugins().snapshot() {
            if let Err(e) = plugin.after_login(&user) {
                return self.login_report(Outcome::error(
                    ResultCode::Sdk,
                    "login.plugin.hook",
                    json!(e.to_string()),
                ));
            }
        }

        if user.registered {
            let _ = self.track_user_login(user.clone()).await;
        } else {
            let _ = self.track_user_create().await;
        }

        let outcome = Outcome::success(triggers::LOGIN_SDK, user.to_value());
        self.start_timer(timers::TOKEN_REFRESH, params);
        outcome
    }

    /// Publish a login failure and absorb into the error state.
    fn login_failed(&self, outcome: Outcome) -> Outcome {
        self.set_login_state(LoginState::Error);
        self.login_report(outcome)
    }

    /// Publish a login failure without changing state.
    fn login_report(&self, outcome: Outcome) -> Outcome {
        self.hooks().publish(hook_names::ERR_LOGIN, &outcome);
        outcome
    }
}
