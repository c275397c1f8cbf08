//! # Tracking Contract
//!
//! Analytics trackers are external collaborators implementing a fixed
//! contract. The core fans every tracked event out to all registered
//! trackers and aggregates their outcomes; a method a tracker does not
//! implement yields a synthesized not-found outcome for that tracker
//! rather than a crash, which is exactly what the trait defaults below
//! produce.

use crate::results::{Outcome, ResultCode};
use crate::types::{GameOrder, GameRole, User};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Tracked-event dispatch identifier.
///
/// Dispatch is an explicit match over this union; there is no lookup of
/// methods by name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackMethod {
    PushEvent,
    UserCreate,
    UserLogin,
    UserLogout,
    UserEvent,
    UserRecharged,
    RoleLogin,
    RoleCreate,
    RoleUpLevel,
    RoleRecharged,
    RoleEvent,
}

impl TrackMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PushEvent => "PushEvent",
            Self::UserCreate => "UserCreate",
            Self::UserLogin => "UserLogin",
            Self::UserLogout => "UserLogout",
            Self::UserEvent => "UserEvent",
            Self::UserRecharged => "UserRecharged",
            Self::RoleLogin => "RoleLogin",
            Self::RoleCreate => "RoleCreate",
            Self::RoleUpLevel => "RoleUpLevel",
            Self::RoleRecharged => "RoleRecharged",
            Self::RoleEvent => "RoleEvent",
        }
    }

    /// Whether the core requires a logged-in user before fanning out.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Self::PushEvent | Self::UserLogin)
    }
}

impl fmt::Display for TrackMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options record forwarded to every tracker method.
///
/// Only the fields relevant to the dispatched method are populated; the
/// rest serialize away.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<GameRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<GameOrder>,
}

impl TrackPayload {
    pub fn event(event: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            event: Some(event.into()),
            params,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_role(mut self, role: GameRole) -> Self {
        self.role = Some(role);
        self
    }
}

/// Payload handed to every tracker's retry-report hook after login.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<GameRole>,
}

/// Analytics tracker contract.
///
/// Every method has a default body synthesizing a not-found outcome
/// attributed to the tracker; implementors override only the events they
/// actually report.
#[async_trait]
pub trait Tracker: Send + Sync {
    fn name(&self) -> &str;

    /// Synthesized outcome for an unimplemented method.
    fn missing(&self, method: TrackMethod) -> Outcome {
        Outcome::error(
            ResultCode::NotFound,
            self.name().to_string(),
            json!(format!(
                "method:{method} not found from tracker: {}",
                self.name()
            )),
        )
    }

    /// Re-report hook fired after every successful login.
    fn retry(&self, _payload: &RetryPayload) {}

    async fn push_event(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::PushEvent)
    }

    async fn user_create(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::UserCreate)
    }

    async fn user_login(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::UserLogin)
    }

    async fn user_logout(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::UserLogout)
    }

    async fn user_event(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::UserEvent)
    }

    async fn user_recharged(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::UserRecharged)
    }

    async fn role_login(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::RoleLogin)
    }

    async fn role_create(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::RoleCreate)
    }

    async fn role_up_level(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::RoleUpLevel)
    }

    async fn role_recharged(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::RoleRecharged)
    }

    async fn role_event(&self, _payload: TrackPayload) -> Outcome {
        self.missing(TrackMethod::RoleEvent)
    }
}

/// Dispatch one tracked event to one tracker.
pub async fn dispatch(
    tracker: &Arc<dyn Tracker>,
    method: TrackMethod,
    payload: TrackPayload,
) -> Outcome {
    match method {
        TrackMethod::PushEvent => tracker.push_event(payload).await,
        TrackMethod::UserCreate => tracker.user_create(payload).await,
        TrackMethod::UserLogin => tracker.user_login(payload).await,
        TrackMethod::UserLogout => tracker.user_logout(payload).await,
        TrackMethod::UserEvent => tracker.user_event(payload).await,
        TrackMethod::UserRecharged => tracker.user_recharged(payload).await,
        TrackMethod::RoleLogin => tracker.role_login(payload).await,
        TrackMethod::RoleCreate => tracker.role_create(payload).await,
        TrackMethod::RoleUpLevel => tracker.role_up_level(payload).await,
        TrackMethod::RoleRecharged => tracker.role_recharged(payload).await,
        TrackMethod::RoleEvent => tracker.role_event(payload).await,
    }
}

/// Named event handler used by [`BaseTracker`].
pub type EventHandler = Arc<dyn Fn(&TrackPayload) -> Outcome + Send + Sync>;

/// Tracker base with registerable per-event handlers.
///
/// Events without a registered handler acknowledge with success; identity
/// and role lifecycle methods acknowledge unconditionally. Concrete
/// trackers that need full control implement [`Tracker`] directly.
pub struct BaseTracker {
    name: String,
    event_handlers: RwLock<HashMap<String, EventHandler>>,
    user_event_handlers: RwLock<HashMap<String, EventHandler>>,
    role_event_handlers: RwLock<HashMap<String, EventHandler>>,
}

impl BaseTracker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            event_handlers: RwLock::new(HashMap::new()),
            user_event_handlers: RwLock::new(HashMap::new()),
            role_event_handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler for a plain event name.
    pub fn reg_event(&self, event: impl Into<String>, handler: EventHandler) {
        self.event_handlers.write().insert(event.into(), handler);
    }

    /// Register a handler for a user-scoped event name.
    pub fn reg_user_event(&self, event: impl Into<String>, handler: EventHandler) {
        self.user_event_handlers.write().insert(event.into(), handler);
    }

    /// Register a handler for a role-scoped event name.
    pub fn reg_role_event(&self, event: impl Into<String>, handler: EventHandler) {
        self.role_event_handlers.write().insert(event.into(), handler);
    }

    fn acknowledge(&self) -> Outcome {
        Outcome::success(self.name.clone(), Value::Null)
    }

    fn run_named(
        &self,
        handlers: &RwLock<HashMap<String, EventHandler>>,
        payload: &TrackPayload,
    ) -> Outcome {
        let handler = payload
            .event
            .as_deref()
            .and_then(|event| handlers.read().get(event).cloned());
        match handler {
            Some(handler) => handler(payload),
            None => self.acknowledge(),
        }
    }
}

#[async_trait]
impl Tracker for BaseTracker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn push_event(&self, payload: TrackPayload) -> Outcome {
        self.run_named(&self.event_handlers, &payload)
    }

    async fn user_create(&self, _payload: TrackPayload) -> Outcome {
        self.acknowledge()
    }

    async fn user_login(&self, _payload: TrackPayload) -> Outcome {
        self.acknowledge()
    }

    async fn user_logout(&self, _payload: TrackPayload) -> Outcome {
        self.acknowledge()
    }

    async fn user_event(&self, payload: TrackPayload) -> Outcome {
        self.run_named(&self.user_event_handlers, &payload)
    }

    async fn user_recharged(&self, _payload: TrackPayload) -> Outcome {
        self.acknowledge()
    }

    async fn role_login(&self, _payload: TrackPayload) -> Outcome {
        self.acknowledge()
    }

    async fn role_create(&self, _payload: TrackPayload) -> Outcome {
        self.acknowledge()
    }

    async fn role_up_level(&self, _payload: TrackPayload) -> Outcome {
        self.acknowledge()
    }

    async fn role_recharged(&self, _payload: TrackPayload) -> Outcome {
        self.acknowledge()
    }

    async fn role_event(&self, payload: TrackPayload) -> Outcome {
        self.run_named(&self.role_event_handlers, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MinimalTracker;

    #[async_trait]
    impl Tracker for MinimalTracker {
        fn name(&self) -> &str {
            "minimal"
        }

        async fn push_event(&self, _payload: TrackPayload) -> Outcome {
            Outcome::success("minimal", Value::Null)
        }
    }

    #[tokio::test]
    async fn unimplemented_methods_synthesize_not_found() {
        let tracker: Arc<dyn Tracker> = Arc::new(MinimalTracker);

        let outcome = dispatch(&tracker, TrackMethod::RoleLogin, TrackPayload::default()).await;
        assert_eq!(outcome.code, ResultCode::NotFound);
        assert_eq!(outcome.trigger, "minimal");
        assert!(outcome
            .payload
            .as_str()
            .unwrap()
            .contains("method:RoleLogin not found"));

        let implemented =
            dispatch(&tracker, TrackMethod::PushEvent, TrackPayload::default()).await;
        assert!(implemented.is_success());
    }

    #[tokio::test]
    async fn base_tracker_routes_registered_events() {
        let tracker = BaseTracker::new("base");
        tracker.reg_event(
            "level.clear",
            Arc::new(|payload: &TrackPayload| {
                Outcome::success("level.clear", payload.params.clone().unwrap_or(Value::Null))
            }),
        );

        let routed = tracker
            .push_event(TrackPayload::event("level.clear", Some(json!({"level": 3}))))
            .await;
        assert_eq!(routed.trigger, "level.clear");
        assert_eq!(routed.payload["level"], 3);

        // unregistered events acknowledge with success
        let acked = tracker
            .push_event(TrackPayload::event("unknown", None))
            .await;
        assert!(acked.is_success());
        assert_eq!(acked.trigger, "base");
    }

    #[test]
    fn auth_requirements_follow_the_contract() {
        assert!(!TrackMethod::PushEvent.requires_auth());
        assert!(!TrackMethod::UserLogin.requires_auth());
        assert!(TrackMethod::UserCreate.requires_auth());
        assert!(TrackMethod::RoleRecharged.requires_auth());
    }
}
