use crate::results::{Outcome, ResultCode};
use serde_json::json;

/// Crate-level error type for fallible core APIs.
///
/// Pipeline steps report failure through [`Outcome`] codes; `CoreError` is
/// reserved for the seams where a Rust `Result` is the natural contract:
/// configuration loading, plugin construction, and untrusted hook
/// callbacks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Hook error: {0}")]
    Hook(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Queue error: {0}")]
    Queue(String),
}

impl CoreError {
    /// Convert into an error [`Outcome`] attributed to `trigger`.
    pub fn into_outcome(self, code: ResultCode, trigger: impl Into<String>) -> Outcome {
        Outcome::error(code, trigger, json!(self.to_string()))
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
