//! # Login Pipeline States
//!
//! State definitions for the login sequence. The pipeline itself is a
//! sequential async routine; the state is tracked for observability and
//! for the idempotent already-logged-in short-circuit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Login pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    /// No login attempt has completed
    #[default]
    Unauthenticated,
    /// Platform authentication handler is running
    Authenticating,
    /// Platform authentication succeeded
    Authenticated,
    /// SDK login handler is running
    LoggingIn,
    /// Login completed; the session user is set
    LoggedIn,
    /// A transition reported failure; no automatic retry
    Error,
}

impl LoginState {
    /// Check if the session holds a logged-in user
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn)
    }

    /// Check if this is the error absorption state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Check if a login attempt is in flight
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Authenticating | Self::Authenticated | Self::LoggingIn)
    }
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::LoggingIn => write!(f, "logging_in"),
            Self::LoggedIn => write!(f, "logged_in"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for LoginState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unauthenticated" => Ok(Self::Unauthenticated),
            "authenticating" => Ok(Self::Authenticating),
            "authenticated" => Ok(Self::Authenticated),
            "logging_in" => Ok(Self::LoggingIn),
            "logged_in" => Ok(Self::LoggedIn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid login state: {s}")),
        }
    }
}
