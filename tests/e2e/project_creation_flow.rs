//! # Live Project Creation Flow
//!
//! Runs the whole flow against real services with a local Chromium:
//! 1. create the project through the API
//! 2. dashboard heading visible
//! 3. mobile viewport width reported as 390
//! 4. a fresh context cannot see the project
//!
//! Prerequisites: the API and UI are reachable (see `IntegrationTestManager`
//! for the environment overrides) and Chrome/Chromium is installed.

use anyhow::Result;

use projectflow::logging::init_structured_logging;
use projectflow::scenario::{ProjectFlowScenario, ScenarioState};

use crate::common::integration_test_manager::IntegrationTestManager;

#[tokio::test]
async fn test_project_creation_flow_end_to_end() -> Result<()> {
    init_structured_logging();
    println!("🚀 Starting live project creation flow");

    let manager = IntegrationTestManager::setup().await?;
    println!("\n🎉 Services ready! URLs:");
    println!("   API: {}", manager.api_url);
    println!("   UI:  {}", manager.ui_url);

    let scenario = ProjectFlowScenario::with_chromium(manager.config.clone())?;
    let run = scenario.run().await;

    println!("\n📋 Report:\n{}", run.report.to_json_pretty()?);
    let report = run.into_result()?;

    assert_eq!(report.final_state, ScenarioState::Done);
    assert_eq!(report.resource_id, Some(123));
    println!("\n✅ Live project creation flow passed in {}ms", report.elapsed_ms);
    Ok(())
}
