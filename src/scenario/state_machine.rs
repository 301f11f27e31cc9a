use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{events::ScenarioEvent, states::ScenarioState};
use crate::error::{FlowError, FlowResult};

/// One recorded transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub sort_key: u32,
    pub from_state: ScenarioState,
    pub to_state: ScenarioState,
    pub event: ScenarioEvent,
    pub transitioned_at: DateTime<Utc>,
}

/// Linear state machine over the scenario's four checks
///
/// Transitions only move forward one state at a time; `Fail` is accepted from
/// any non-terminal state. Every accepted transition is appended to the log.
#[derive(Debug, Clone)]
pub struct ScenarioStateMachine {
    run_id: Uuid,
    current: ScenarioState,
    transitions: Vec<TransitionRecord>,
}

impl ScenarioStateMachine {
    /// Create a new state machine in `Pending`
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            current: ScenarioState::default(),
            transitions: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn current_state(&self) -> ScenarioState {
        self.current
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    /// Attempt to transition the scenario state
    pub fn transition(&mut self, event: ScenarioEvent) -> FlowResult<ScenarioState> {
        let from_state = self.current;
        let to_state = Self::determine_target_state(from_state, &event)?;

        debug!(
            run_id = %self.run_id,
            from = %from_state,
            to = %to_state,
            event = event.event_type(),
            "Scenario transition"
        );

        self.transitions.push(TransitionRecord {
            sort_key: u32::try_from(self.transitions.len()).unwrap_or(u32::MAX),
            from_state,
            to_state,
            event,
            transitioned_at: Utc::now(),
        });
        self.current = to_state;

        Ok(to_state)
    }

    /// Determine the target state based on current state and event
    fn determine_target_state(
        current_state: ScenarioState,
        event: &ScenarioEvent,
    ) -> FlowResult<ScenarioState> {
        let target = match (current_state, event) {
            (ScenarioState::Pending, ScenarioEvent::ResourceCreated { .. }) => {
                ScenarioState::ApiCreated
            }
            (ScenarioState::ApiCreated, ScenarioEvent::UiVerified) => ScenarioState::UiVerified,
            (ScenarioState::UiVerified, ScenarioEvent::MobileVerified { .. }) => {
                ScenarioState::MobileVerified
            }
            (ScenarioState::MobileVerified, ScenarioEvent::IsolationVerified) => {
                ScenarioState::IsolationVerified
            }
            (ScenarioState::IsolationVerified, ScenarioEvent::Finish) => ScenarioState::Done,

            // Failure from anywhere still running
            (from, ScenarioEvent::Fail(_)) if !from.is_terminal() => ScenarioState::Failed,

            (from_state, _) => {
                return Err(FlowError::InvalidTransition {
                    from: from_state.to_string(),
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }
}
