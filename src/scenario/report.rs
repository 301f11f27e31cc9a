use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ScenarioState, ScenarioStep, TransitionRecord};
use crate::error::{FlowError, FlowResult};
use crate::fixtures::TeardownOutcome;

/// Why a run stopped short of `Done`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSummary {
    pub step: Option<ScenarioStep>,
    pub message: String,
    /// An expectation was not met, as opposed to an infrastructure error
    pub assertion: bool,
}

impl From<&FlowError> for FailureSummary {
    fn from(err: &FlowError) -> Self {
        Self {
            step: err.failed_step(),
            message: err.to_string(),
            assertion: err.is_assertion(),
        }
    }
}

/// Outcome of one scenario run, serialisable for CI artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub run_id: Uuid,
    pub resource_id: Option<i64>,
    pub resource_title: Option<String>,
    pub final_state: ScenarioState,
    pub transitions: Vec<TransitionRecord>,
    pub failure: Option<FailureSummary>,
    pub teardown: Option<TeardownOutcome>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.final_state == ScenarioState::Done
    }

    /// States visited after `Pending`, in order
    pub fn visited_states(&self) -> Vec<ScenarioState> {
        self.transitions.iter().map(|t| t.to_state).collect()
    }

    pub fn to_json_pretty(&self) -> FlowResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A finished run: the report plus the error that ended it, if any
#[derive(Debug)]
pub struct ScenarioRun {
    pub report: ScenarioReport,
    pub result: FlowResult<()>,
}

impl ScenarioRun {
    pub fn state(&self) -> ScenarioState {
        self.report.final_state
    }

    /// The report on success, the failing error otherwise
    pub fn into_result(self) -> FlowResult<ScenarioReport> {
        self.result.map(|()| self.report)
    }
}
