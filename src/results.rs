//! # Outcome Types
//!
//! Shared value types used by every other component: the single [`Outcome`]
//! record, the [`OutcomeSet`] aggregate, and the [`ResultCode`] taxonomy.
//!
//! Every component communicates failure exclusively through
//! [`Outcome::code`]; no panics cross component boundaries in the
//! steady-state path.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Integer-coded result taxonomy shared across all pipelines.
///
/// External handlers may return any domain-specific integer; codes outside
/// the reserved set round-trip through [`ResultCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// Unknown error, typically a caught failure from an untrusted callback
    Unknown,
    /// Success
    Success,
    /// SDK-internal error
    Sdk,
    /// Channel backend error
    Channel,
    /// Platform backend error
    Platform,
    /// Policy rejection
    Policy,
    /// Malformed or unexpected data
    Data,
    /// Operation requires a logged-in user
    Unauthenticated,
    /// Initialization aggregation failure
    Initialize,
    /// Invalid parameters
    Parameters,
    /// Requested object not found
    NotFound,
    /// No handler registered under the requested name
    HandlerNotFound,
    /// HTTP status code error reported by a collaborator
    HttpStatus,
    /// HTTP payload error reported by a collaborator
    HttpPayload,
    /// Domain-specific code supplied by an external handler
    Other(i32),
}

impl ResultCode {
    /// Raw integer representation carried on the wire.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::Success => 0,
            Self::Sdk => 1,
            Self::Channel => 2,
            Self::Platform => 3,
            Self::Policy => 4,
            Self::Data => 5,
            Self::Unauthenticated => 11,
            Self::Initialize => 12,
            Self::Parameters => 13,
            Self::NotFound => 14,
            Self::HandlerNotFound => 15,
            Self::HttpStatus => 100,
            Self::HttpPayload => 101,
            Self::Other(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl From<i32> for ResultCode {
    fn from(code: i32) -> Self {
        match code {
            -1 => Self::Unknown,
            0 => Self::Success,
            1 => Self::Sdk,
            2 => Self::Channel,
            3 => Self::Platform,
            4 => Self::Policy,
            5 => Self::Data,
            11 => Self::Unauthenticated,
            12 => Self::Initialize,
            13 => Self::Parameters,
            14 => Self::NotFound,
            15 => Self::HandlerNotFound,
            100 => Self::HttpStatus,
            101 => Self::HttpPayload,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

impl Serialize for ResultCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for ResultCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from(i32::deserialize(deserializer)?))
    }
}

/// Single outcome record: an integer code, a trigger label attributing the
/// step or handler that produced it, and an opaque payload.
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub code: ResultCode,
    pub trigger: String,
    #[serde(default)]
    pub payload: Value,
}

impl Outcome {
    pub fn new(code: ResultCode, trigger: impl Into<String>, payload: Value) -> Self {
        Self {
            code,
            trigger: trigger.into(),
            payload,
        }
    }

    /// Success outcome with the given trigger and payload.
    pub fn success(trigger: impl Into<String>, payload: Value) -> Self {
        Self::new(ResultCode::Success, trigger, payload)
    }

    /// Error outcome with the given code, trigger and payload.
    pub fn error(code: ResultCode, trigger: impl Into<String>, payload: Value) -> Self {
        Self::new(code, trigger, payload)
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Best-effort human-readable rendering for logs and alerts.
    pub fn message(&self) -> String {
        let prefix = if self.is_success() {
            "result success"
        } else {
            "result failed"
        };
        let payload = match &self.payload {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!(
            "{prefix}, trigger: '{}', payload: '{payload}'",
            self.trigger
        )
    }
}

/// Aggregate of many [`Outcome`]s, partitioned by code.
///
/// Invariants: `failure == errors.len()` and
/// `success.len() + errors.len()` equals the number of merged inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSet {
    pub trigger: String,
    pub failure: usize,
    pub success: Vec<Outcome>,
    pub errors: Vec<Outcome>,
}

impl OutcomeSet {
    /// Empty aggregate: no inputs, no failures.
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            failure: 0,
            success: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Merge an ordered sequence of outcomes, partitioning by code.
    pub fn collect(trigger: impl Into<String>, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let mut set = Self::new(trigger);
        for outcome in outcomes {
            set.push(outcome);
        }
        set
    }

    /// Append one outcome, keeping the partition invariants.
    pub fn push(&mut self, outcome: Outcome) {
        if outcome.is_success() {
            self.success.push(outcome);
        } else {
            self.failure += 1;
            self.errors.push(outcome);
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failure == 0
    }

    pub fn len(&self) -> usize {
        self.success.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
