use serde::{Deserialize, Serialize};
use std::fmt;

/// Scenario state definitions, in the order a passing run visits them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    /// Nothing has run yet
    #[default]
    Pending,
    /// The data fixture created the resource
    ApiCreated,
    /// The dashboard heading became visible
    UiVerified,
    /// The mobile context reported the expected viewport width
    MobileVerified,
    /// A foreign context could not see the resource
    IsolationVerified,
    /// Every check passed
    Done,
    /// A step failed; the sequence halted
    Failed,
}

impl ScenarioState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// The step that runs from this state, if any
    pub fn next_step(&self) -> Option<ScenarioStep> {
        match self {
            Self::Pending => Some(ScenarioStep::CreateResource),
            Self::ApiCreated => Some(ScenarioStep::VerifyUi),
            Self::UiVerified => Some(ScenarioStep::VerifyMobile),
            Self::MobileVerified => Some(ScenarioStep::VerifyIsolation),
            Self::IsolationVerified | Self::Done | Self::Failed => None,
        }
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::ApiCreated => write!(f, "api_created"),
            Self::UiVerified => write!(f, "ui_verified"),
            Self::MobileVerified => write!(f, "mobile_verified"),
            Self::IsolationVerified => write!(f, "isolation_verified"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ScenarioState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "api_created" => Ok(Self::ApiCreated),
            "ui_verified" => Ok(Self::UiVerified),
            "mobile_verified" => Ok(Self::MobileVerified),
            "isolation_verified" => Ok(Self::IsolationVerified),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid scenario state: {s}")),
        }
    }
}

/// The four checks of the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStep {
    CreateResource,
    VerifyUi,
    VerifyMobile,
    VerifyIsolation,
}

impl ScenarioStep {
    /// 1-based position in the sequence
    pub fn number(&self) -> u8 {
        match self {
            Self::CreateResource => 1,
            Self::VerifyUi => 2,
            Self::VerifyMobile => 3,
            Self::VerifyIsolation => 4,
        }
    }

    /// Progress line logged once the step passes
    pub fn progress_message(&self, title: &str) -> String {
        match self {
            Self::CreateResource => format!("Step 1: Project '{title}' created via API."),
            Self::VerifyUi => "Step 2: UI Dashboard loaded successfully.".to_string(),
            Self::VerifyMobile => "Step 3: Mobile view verified.".to_string(),
            Self::VerifyIsolation => {
                "Step 4: Security check passed. Tenant isolation verified.".to_string()
            }
        }
    }
}

impl fmt::Display for ScenarioStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateResource => write!(f, "create_resource"),
            Self::VerifyUi => write!(f, "verify_ui"),
            Self::VerifyMobile => write!(f, "verify_mobile"),
            Self::VerifyIsolation => write!(f, "verify_isolation"),
        }
    }
}
