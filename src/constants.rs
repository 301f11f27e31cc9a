//! # Flow Constants
//!
//! Default endpoints, device profile values and fixture payload used when no
//! configuration overrides them.

/// Public mock API used by the demo flow
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";

/// Web UI the flow navigates to
pub const DEFAULT_UI_URL: &str = "https://example.com";

/// Collection path the resource is created under
pub const RESOURCES_PATH: &str = "/posts";

/// UI path template for a single project; `{id}` is replaced with the resource id
pub const PROJECT_PATH_TEMPLATE: &str = "/projects/{id}";

/// Id forced onto every created record; the demo API does not persist real ids
pub const SENTINEL_RESOURCE_ID: i64 = 123;

/// Default creation payload
pub mod payload {
    pub const TITLE: &str = "Integration Test Project";
    pub const BODY: &str = "Created via Pytest";
    pub const USER_ID: i64 = 1;
}

/// iPhone 13 Pro device profile
pub mod mobile {
    pub const DEVICE_NAME: &str = "iPhone 13 Pro";
    pub const VIEWPORT_WIDTH: u32 = 390;
    pub const VIEWPORT_HEIGHT: u32 = 844;
    pub const USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1";
}

/// Expectation timing
pub mod timing {
    /// Deadline for the dashboard heading to become visible
    pub const VISIBILITY_TIMEOUT_MS: u64 = 10_000;
    /// Deadline for other retrying assertions
    pub const ASSERTION_TIMEOUT_MS: u64 = 5_000;
    pub const POLL_INTERVAL_MS: u64 = 100;
}

/// Selectors the scenario asserts against
pub mod selectors {
    pub const DASHBOARD_HEADING: &str = "h1";
    pub const PAGE_BODY: &str = "body";
}

/// Environment variable names
pub mod env {
    pub const CONFIG_PREFIX: &str = "PROJECTFLOW";
    pub const ENVIRONMENT: &str = "PROJECTFLOW_ENV";
}
