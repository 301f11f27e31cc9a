use serde::{Deserialize, Serialize};

/// Events that drive scenario state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// Data fixture returned a record
    ResourceCreated { resource_id: i64 },
    /// Dashboard heading visible
    UiVerified,
    /// Mobile viewport width confirmed
    MobileVerified { width: u32 },
    /// Foreign context saw no trace of the resource
    IsolationVerified,
    /// Close out a fully verified run
    Finish,
    /// Halt the sequence with an error message
    Fail(String),
}

impl ScenarioEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ResourceCreated { .. } => "resource_created",
            Self::UiVerified => "ui_verified",
            Self::MobileVerified { .. } => "mobile_verified",
            Self::IsolationVerified => "isolation_verified",
            Self::Finish => "finish",
            Self::Fail(_) => "fail",
        }
    }

    /// Extract error message if this is a failure event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Fail(msg) => Some(msg),
            _ => None,
        }
    }

    /// Create a failure event with the given error message
    pub fn fail_with_error(error: impl Into<String>) -> Self {
        Self::Fail(error.into())
    }
}
