//! # Scenario
//!
//! The project creation flow as a linear state machine:
//! `Pending -> ApiCreated -> UiVerified -> MobileVerified -> IsolationVerified -> Done`,
//! with `Failed` reachable from any running state.

pub mod events;
pub mod report;
pub mod runner;
pub mod state_machine;
pub mod states;

pub use events::ScenarioEvent;
pub use report::{FailureSummary, ScenarioReport, ScenarioRun};
pub use runner::ProjectFlowScenario;
pub use state_machine::{ScenarioStateMachine, TransitionRecord};
pub use states::{ScenarioState, ScenarioStep};
