//! Tracker fan-out and the public tracking surface.
//!
//! Every tracked event goes to every registered tracker concurrently and
//! the per-tracker outcomes are aggregated; user- and role-scoped events
//! fail fast with an unauthenticated aggregate when no session user is
//! set.

use super::Core;
use crate::results::{Outcome, OutcomeSet, ResultCode};
use crate::tracker::{self, TrackMethod, TrackPayload};
use crate::types::{GameOrder, GameRole, User};
use futures::future::join_all;
use serde_json::Value;
use tracing::debug;

impl Core {
    /// Fan one tracked event out to every registered tracker.
    async fn handler_trace(&self, method: TrackMethod, mut payload: TrackPayload) -> OutcomeSet {
        let trigger = format!("core.sdk.{method}");
        if method.requires_auth() {
            match self.user() {
                Some(user) => payload.user = Some(user),
                None => {
                    let mut set = OutcomeSet::new(format!("{trigger}.unauthenticated"));
                    set.push(Outcome::error(
                        ResultCode::Unauthenticated,
                        trigger,
                        Value::Null,
                    ));
                    return set;
                }
            }
        }

        let trackers = self.trackers().snapshot();
        if trackers.is_empty() {
            return OutcomeSet::new(trigger);
        }
        let calls = trackers.into_iter().map(|(name, tracker)| {
            let payload = payload.clone();
            async move {
                debug!(tracker = %name, method = %method, "tracker call");
                tracker::dispatch(&tracker, method, payload).await
            }
        });
        OutcomeSet::collect(trigger, join_all(calls).await)
    }

    /// Track an event that does not require a logged-in user.
    pub async fn push_event(&self, event: impl Into<String>, params: Option<Value>) -> OutcomeSet {
        self.handler_trace(TrackMethod::PushEvent, TrackPayload::event(event, params))
            .await
    }

    /// Account creation tracking, fired by the login pipeline.
    pub(crate) async fn track_user_create(&self) -> OutcomeSet {
        self.handler_trace(TrackMethod::UserCreate, TrackPayload::default())
            .await
    }

    /// Returning-account login tracking, fired by the login pipeline.
    pub(crate) async fn track_user_login(&self, user: User) -> OutcomeSet {
        self.handler_trace(
            TrackMethod::UserLogin,
            TrackPayload::default().with_user(user),
        )
        .await
    }

    /// Track a user logout, optionally scoped to a role.
    pub async fn user_logout(&self, role: Option<GameRole>) -> OutcomeSet {
        let mut payload = TrackPayload::default();
        payload.role = role;
        self.handler_trace(TrackMethod::UserLogout, payload).await
    }

    /// Track a user-scoped event.
    pub async fn user_event(&self, event: impl Into<String>, params: Option<Value>) -> OutcomeSet {
        self.handler_trace(TrackMethod::UserEvent, TrackPayload::event(event, params))
            .await
    }

    /// Track a completed user payment.
    pub async fn user_recharged(
        &self,
        id: impl Into<String>,
        payment: Value,
        params: Value,
    ) -> OutcomeSet {
        let payload = TrackPayload {
            id: Some(id.into()),
            payment: Some(payment),
            params: Some(params),
            ..TrackPayload::default()
        };
        self.handler_trace(TrackMethod::UserRecharged, payload).await
    }

    /// Track a role login.
    pub async fn role_login(&self, role: GameRole) -> OutcomeSet {
        self.handler_trace(
            TrackMethod::RoleLogin,
            TrackPayload::default().with_role(role),
        )
        .await
    }

    /// Track a role creation.
    pub async fn role_create(&self, role: GameRole) -> OutcomeSet {
        self.handler_trace(
            TrackMethod::RoleCreate,
            TrackPayload::default().with_role(role),
        )
        .await
    }

    /// Track a role level-up.
    pub async fn role_up_level(&self, role: GameRole, level: u32) -> OutcomeSet {
        let payload = TrackPayload {
            level: Some(level),
            ..TrackPayload::default()
        }
        .with_role(role);
        self.handler_trace(TrackMethod::RoleUpLevel, payload).await
    }

    /// Track a completed role payment.
    pub async fn role_recharged(
        &self,
        id: impl Into<String>,
        order: GameOrder,
        payment: Value,
        params: Value,
    ) -> OutcomeSet {
        let payload = TrackPayload {
            id: Some(id.into()),
            order: Some(order),
            payment: Some(payment),
            params: Some(params),
            ..TrackPayload::default()
        };
        self.handler_trace(TrackMethod::RoleRecharged, payload).await
    }

    /// Track a role-scoped event.
    pub async fn role_event(
        &self,
        event: impl Into<String>,
        role: GameRole,
        params: Option<Value>,
    ) -> OutcomeSet {
        self.handler_trace(
            TrackMethod::RoleEvent,
            TrackPayload::event(event, params).with_role(role),
        )
        .await
    }
}
