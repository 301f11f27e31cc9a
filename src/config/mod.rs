//! # Flow Configuration
//!
//! Explicit configuration for the project creation flow. Endpoints, device
//! profile, expectation deadlines and fixture payload all live here instead of
//! module-wide constants so each environment can override them without code
//! edits.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use projectflow::config::FlowConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Defaults, then ./projectflow.toml, then PROJECTFLOW_* environment variables
//! let config = FlowConfig::load()?;
//!
//! println!("API: {}", config.api.base_url);
//! println!("UI:  {}", config.ui.base_url);
//! # Ok(())
//! # }
//! ```

pub mod loader;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{self, mobile, payload, selectors, timing};
use crate::error::{FlowError, FlowResult};

pub use loader::ConfigLoader;

/// Root configuration for a flow run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Resource API the data fixture talks to
    pub api: ApiEndpointConfig,
    /// Web UI under test
    pub ui: UiConfig,
    /// Browser process settings
    pub browser: BrowserSettings,
    /// Device emulated by the mobile context
    pub mobile: DeviceProfile,
    /// Data fixture payload and teardown behaviour
    pub fixture: FixtureConfig,
}

/// API endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpointConfig {
    /// Base URL for the API (e.g., "<https://jsonplaceholder.typicode.com>")
    pub base_url: String,
    /// Request timeout in milliseconds; `None` keeps the HTTP client default
    pub timeout_ms: Option<u64>,
    /// Bearer token sent with every request (if required)
    pub auth_token: Option<String>,
}

impl Default for ApiEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_API_URL.to_string(),
            timeout_ms: None,
            auth_token: None,
        }
    }
}

/// Web UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub base_url: String,
    /// Path of a single project page, `{id}` is substituted
    pub project_path_template: String,
    pub heading_selector: String,
    pub body_selector: String,
    /// Deadline for the dashboard heading to become visible
    pub visibility_timeout_ms: u64,
    /// Deadline for the remaining retrying assertions
    pub assertion_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_UI_URL.to_string(),
            project_path_template: constants::PROJECT_PATH_TEMPLATE.to_string(),
            heading_selector: selectors::DASHBOARD_HEADING.to_string(),
            body_selector: selectors::PAGE_BODY.to_string(),
            visibility_timeout_ms: timing::VISIBILITY_TIMEOUT_MS,
            assertion_timeout_ms: timing::ASSERTION_TIMEOUT_MS,
            poll_interval_ms: timing::POLL_INTERVAL_MS,
        }
    }
}

impl UiConfig {
    /// URL of the project page for `resource_id`
    pub fn project_url(&self, resource_id: i64) -> String {
        let path = self
            .project_path_template
            .replace("{id}", &resource_id.to_string());
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_millis(self.visibility_timeout_ms)
    }

    pub fn assertion_timeout(&self) -> Duration {
        Duration::from_millis(self.assertion_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Browser process settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Chrome's sandbox; containers usually need it disabled
    pub sandbox: bool,
    /// Explicit Chrome/Chromium binary, otherwise auto-detected
    pub chrome_executable: Option<PathBuf>,
    /// CDP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chrome_executable: None,
            request_timeout_ms: 30_000,
        }
    }
}

/// Emulated device for the mobile context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub user_agent: String,
    /// Enables touch/mobile emulation in addition to the viewport override
    pub is_mobile: bool,
    pub device_scale_factor: f64,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            name: mobile::DEVICE_NAME.to_string(),
            width: mobile::VIEWPORT_WIDTH,
            height: mobile::VIEWPORT_HEIGHT,
            user_agent: mobile::USER_AGENT.to_string(),
            is_mobile: false,
            device_scale_factor: 1.0,
        }
    }
}

/// What the data fixture does at teardown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Log the teardown notice only; the demo API keeps nothing to delete
    #[default]
    LogOnly,
    /// Issue `DELETE {api}/posts/{id}`
    Delete,
}

/// Data fixture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub title: String,
    pub body: String,
    pub user_id: i64,
    pub sentinel_id: i64,
    pub cleanup: CleanupPolicy,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            title: payload::TITLE.to_string(),
            body: payload::BODY.to_string(),
            user_id: payload::USER_ID,
            sentinel_id: constants::SENTINEL_RESOURCE_ID,
            cleanup: CleanupPolicy::LogOnly,
        }
    }
}

impl FlowConfig {
    /// Load configuration from the default file locations and the environment
    pub fn load() -> FlowResult<Self> {
        ConfigLoader::new().load()
    }

    /// Reject values that cannot produce a meaningful run
    pub fn validate(&self) -> FlowResult<()> {
        Url::parse(&self.api.base_url).map_err(|e| {
            FlowError::config_error(format!("Invalid api.base_url '{}': {e}", self.api.base_url))
        })?;
        Url::parse(&self.ui.base_url).map_err(|e| {
            FlowError::config_error(format!("Invalid ui.base_url '{}': {e}", self.ui.base_url))
        })?;

        if !self.ui.project_path_template.contains("{id}") {
            return Err(FlowError::config_error(
                "ui.project_path_template must contain an {id} placeholder",
            ));
        }
        if self.mobile.width == 0 || self.mobile.height == 0 {
            return Err(FlowError::config_error(format!(
                "mobile viewport must be non-empty, got {}x{}",
                self.mobile.width, self.mobile.height
            )));
        }
        if self.mobile.device_scale_factor <= 0.0 {
            return Err(FlowError::config_error(
                "mobile.device_scale_factor must be greater than 0",
            ));
        }
        if self.ui.visibility_timeout_ms == 0 || self.ui.assertion_timeout_ms == 0 {
            return Err(FlowError::config_error(
                "expectation timeouts must be greater than 0",
            ));
        }
        if self.ui.poll_interval_ms == 0 {
            return Err(FlowError::config_error(
                "ui.poll_interval_ms must be greater than 0",
            ));
        }
        if self.api.timeout_ms == Some(0) {
            return Err(FlowError::config_error(
                "api.timeout_ms must be greater than 0 when set",
            ));
        }

        Ok(())
    }

    /// JSON view of the configuration with credentials masked, for logging
    pub fn sanitized(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(token) = value
            .get_mut("api")
            .and_then(|api| api.get_mut("auth_token"))
        {
            if !token.is_null() {
                *token = serde_json::Value::String("[MASKED]".to_string());
            }
        }
        value
    }
}
