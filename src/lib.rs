#![allow(clippy::doc_markdown)] // Allow technical terms like Chromium, CDP in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Project Flow
//!
//! End-to-end verification of the project creation flow across an HTTP API
//! and a web UI.
//!
//! ## Overview
//!
//! One run creates a project through the API, then uses a real browser to
//! check that the dashboard renders, that a mobile context gets the emulated
//! viewport, and that a context with no session cannot see the project. The
//! checks run as a linear state machine and halt at the first failure.
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration (defaults, TOML file, environment)
//! - [`api_clients`] - HTTP client for the resource API
//! - [`fixtures`] - Data fixture and mobile-context fixture
//! - [`browser`] - Browser traits, scoped contexts and the Chromium driver
//! - [`expect`] - Retrying page expectations
//! - [`scenario`] - State machine, runner and report
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use projectflow::config::FlowConfig;
//! use projectflow::scenario::ProjectFlowScenario;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FlowConfig::load()?;
//! let scenario = ProjectFlowScenario::with_chromium(config)?;
//!
//! let run = scenario.run().await;
//! println!("final state: {}", run.report.final_state);
//! run.into_result()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                                  # Unit and scenario tests, no browser needed
//! cargo test --features test-services         # Live run against real services and Chromium
//! ```

pub mod api_clients;
pub mod browser;
pub mod config;
pub mod constants;
pub mod error;
pub mod expect;
pub mod fixtures;
pub mod logging;
pub mod models;
pub mod scenario;

pub use api_clients::{ApiResponse, ResourceApiClient};
pub use browser::{
    with_context, BrowserContext, BrowserDriver, BrowserLauncher, BrowserPage, ChromiumLauncher,
    ContextOptions, ViewportSize,
};
pub use config::{CleanupPolicy, ConfigLoader, FlowConfig};
pub use error::{FlowError, FlowResult};
pub use fixtures::{with_mobile_context, ResourceFixture, TeardownOutcome};
pub use models::{NewResource, ResourceRecord};
pub use scenario::{
    ProjectFlowScenario, ScenarioEvent, ScenarioReport, ScenarioRun, ScenarioState,
    ScenarioStateMachine, ScenarioStep,
};
