//! # Live Integration Test Manager
//!
//! Lightweight manager for runs against real services: it assumes the
//! resource API and the web UI are already up, checks they answer, and builds
//! the flow configuration pointing at them.
//!
//! ## Configuration Precedence
//!
//! Uses 2-tier precedence (highest to lowest):
//! 1. **Environment Variables** (highest priority)
//!    - `PROJECTFLOW_TEST_API_URL` - Override resource API base URL
//!    - `PROJECTFLOW_TEST_UI_URL` - Override web UI base URL
//!    - `PROJECTFLOW_TEST_HEADED` - Show the browser window
//!    - `PROJECTFLOW_TEST_SKIP_HEALTH_CHECK` - Skip reachability checks
//!    - `PROJECTFLOW_TEST_HEALTH_TIMEOUT` - Reachability timeout in seconds
//! 2. **Code Defaults** (lowest priority)
//!    - API: `https://jsonplaceholder.typicode.com`
//!    - UI: `https://example.com`
//!
//! ## Usage
//!
//! ```bash
//! PROJECTFLOW_TEST_UI_URL=http://localhost:3000 cargo test --features test-services --test e2e_tests
//! ```

#![expect(
    dead_code,
    reason = "Test module for live integration test management"
)]

use anyhow::Result;
use std::env;
use std::time::Duration;
use tokio::time::sleep;

use projectflow::config::FlowConfig;
use projectflow::constants::{DEFAULT_API_URL, DEFAULT_UI_URL};

/// Integration test manager for live services
pub struct IntegrationTestManager {
    pub api_url: String,
    pub ui_url: String,
    pub config: FlowConfig,
}

/// Configuration for service discovery and health checks
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    pub api_url: String,
    pub ui_url: String,
    pub headed: bool,
    pub skip_health_check: bool,
    pub health_timeout_seconds: u64,
    pub health_retry_interval_seconds: u64,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        // 2-tier precedence: ENV VAR -> Code Default
        let api_url = env::var("PROJECTFLOW_TEST_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let ui_url =
            env::var("PROJECTFLOW_TEST_UI_URL").unwrap_or_else(|_| DEFAULT_UI_URL.to_string());

        Self {
            api_url,
            ui_url,

            headed: env::var("PROJECTFLOW_TEST_HEADED")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),

            skip_health_check: env::var("PROJECTFLOW_TEST_SKIP_HEALTH_CHECK")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),

            health_timeout_seconds: env::var("PROJECTFLOW_TEST_HEALTH_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),

            health_retry_interval_seconds: 2,
        }
    }
}

impl IntegrationTestManager {
    /// Set up with environment overrides applied to the defaults
    pub async fn setup() -> Result<Self> {
        Self::setup_with_config(IntegrationConfig::default()).await
    }

    pub async fn setup_with_config(config: IntegrationConfig) -> Result<Self> {
        println!("🚀 Setting up Live Integration Test Manager");
        println!("   API URL: {}", config.api_url);
        println!("   UI URL:  {}", config.ui_url);

        if config.skip_health_check {
            println!("⚠️  Reachability checks skipped (PROJECTFLOW_TEST_SKIP_HEALTH_CHECK=true)");
        } else {
            Self::wait_until_reachable("API", &config.api_url, &config).await?;
            Self::wait_until_reachable("UI", &config.ui_url, &config).await?;
        }

        let mut flow_config = FlowConfig::default();
        flow_config.api.base_url = config.api_url.clone();
        flow_config.ui.base_url = config.ui_url.clone();
        flow_config.browser.headless = !config.headed;
        flow_config.validate()?;

        println!("✅ Live Integration Test Manager ready!");

        Ok(Self {
            api_url: config.api_url,
            ui_url: config.ui_url,
            config: flow_config,
        })
    }

    /// Retry a GET until the service answers with anything below 500
    async fn wait_until_reachable(name: &str, url: &str, config: &IntegrationConfig) -> Result<()> {
        println!("🔍 Checking {name} at {url}...");

        let client = reqwest::Client::new();
        let start_time = std::time::Instant::now();
        let timeout_duration = Duration::from_secs(config.health_timeout_seconds);
        let retry_interval = Duration::from_secs(config.health_retry_interval_seconds);

        while start_time.elapsed() < timeout_duration {
            match client
                .get(url)
                .timeout(Duration::from_secs(5))
                .send()
                .await
            {
                Ok(response) if !response.status().is_server_error() => {
                    println!("✅ {name} is reachable");
                    return Ok(());
                }
                Ok(response) => {
                    println!("   ⏳ {name} answered {}, retrying", response.status());
                }
                Err(e) => {
                    println!("   ⏳ {name} unreachable, retrying: {e}");
                }
            }
            sleep(retry_interval).await;
        }

        Err(anyhow::anyhow!(
            "{name} at {url} is not reachable after {}s",
            config.health_timeout_seconds
        ))
    }
}
