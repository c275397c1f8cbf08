//! # Domain Value Types
//!
//! Identity and pass-through records shared by the pipelines. The core
//! assembles [`User`] once per session; role, order and payment records
//! are opaque and forwarded to handlers and trackers unmodified.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Opaque per-source identity record supplied by external backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct UserInfo(pub Value);

/// Opaque game role record; forwarded to tracking and payment handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct GameRole(pub Value);

/// Opaque game order record; forwarded to tracking and payment handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct GameOrder(pub Value);

/// Session identity assembled after a successful login.
///
/// Non-`None` on the session if and only if login completed successfully;
/// cleared only by process restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub sdk: UserInfo,
    pub channel: UserInfo,
    pub platform: UserInfo,
    /// `true` for a returning account, `false` for a newly created one
    #[serde(default)]
    pub registered: bool,
}

impl User {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Request forwarded to the payment method selection handler.
#[derive(Debug, Clone, Serialize)]
pub struct PayRequest {
    pub order: GameOrder,
    pub params: Value,
    pub user: User,
}

impl PayRequest {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Request for the selected submission handler: the selection payload
    /// is attached under `payment`.
    pub fn submission(&self, payment: Value) -> Value {
        json!({
            "order": self.order,
            "params": self.params,
            "user": self.user,
            "payment": payment,
        })
    }
}
