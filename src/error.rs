//! # Flow Error Types
//!
//! Unified error handling for the fixtures, browser driver and scenario runner.

use thiserror::Error;

use crate::scenario::ScenarioStep;

/// Flow operation result type
pub type FlowResult<T> = Result<T, FlowError>;

/// Error types for every stage of the project creation flow
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The create-resource call did not answer 201; nothing else may run.
    #[error("API prerequisite failed: {status} - {message}")]
    ApiPrerequisite { status: u16, message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Expectation not met within {timeout_ms}ms: {expectation}")]
    ExpectationTimeout { expectation: String, timeout_ms: u64 },

    #[error("Assertion failed: expected {expectation}, got {actual}")]
    AssertionFailed { expectation: String, actual: String },

    #[error("Browser context {context_id} is already closed")]
    ContextClosed { context_id: String },

    #[error("Invalid scenario transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Step {step} failed: {source}")]
    StepFailed {
        step: ScenarioStep,
        #[source]
        source: Box<FlowError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FlowError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a browser error
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser(message.into())
    }

    /// Create a navigation error for the given URL
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an assertion failure
    pub fn assertion(expectation: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::AssertionFailed {
            expectation: expectation.into(),
            actual: actual.into(),
        }
    }

    /// Wrap an error with the scenario step it interrupted
    pub fn at_step(self, step: ScenarioStep) -> Self {
        match self {
            already @ Self::StepFailed { .. } => already,
            other => Self::StepFailed {
                step,
                source: Box::new(other),
            },
        }
    }

    /// The step this error was raised in, if it has been attributed to one
    pub fn failed_step(&self) -> Option<ScenarioStep> {
        match self {
            Self::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Whether this failure is an unmet expectation rather than an infrastructure problem
    #[must_use]
    pub fn is_assertion(&self) -> bool {
        match self {
            Self::ExpectationTimeout { .. } | Self::AssertionFailed { .. } => true,
            Self::StepFailed { source, .. } => source.is_assertion(),
            _ => false,
        }
    }
}

impl From<config::ConfigError> for FlowError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for FlowError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}
