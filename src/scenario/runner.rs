//! # Project Flow Scenario
//!
//! Drives the four checks in order:
//!
//! 1. create the resource through the API (fail-fast on anything but 201)
//! 2. the dashboard heading becomes visible in a primary context
//! 3. a mobile context reports the emulated viewport width
//! 4. a fresh context opened on the project page cannot see the resource
//!
//! The browser is launched only after the data fixture succeeds. Every context
//! is opened through [`with_context`] so it is closed on every exit path.
//! Fixture teardown and browser shutdown run whether the browser checks pass,
//! fail or panic.

use chrono::Utc;
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::report::{FailureSummary, ScenarioReport, ScenarioRun};
use super::{ScenarioEvent, ScenarioStateMachine, ScenarioStep};
use crate::api_clients::ResourceApiClient;
use crate::browser::{
    with_context, BrowserContext, BrowserDriver, BrowserLauncher, ChromiumLauncher, ContextOptions,
};
use crate::config::FlowConfig;
use crate::error::FlowResult;
use crate::expect::{viewport_width_equals, Expect};
use crate::fixtures::{with_mobile_context, ResourceFixture, TeardownOutcome};
use crate::logging::log_scenario_step;
use crate::models::ResourceRecord;

/// Values gathered while the scenario runs, folded into the report at the end
#[derive(Debug, Default)]
struct RunProgress {
    record: Option<ResourceRecord>,
    teardown: Option<TeardownOutcome>,
}

/// End-to-end project creation flow
pub struct ProjectFlowScenario {
    config: FlowConfig,
    api: ResourceApiClient,
    launcher: Arc<dyn BrowserLauncher>,
}

impl std::fmt::Debug for ProjectFlowScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectFlowScenario")
            .field("api", &self.api)
            .field("ui_base_url", &self.config.ui.base_url)
            .finish_non_exhaustive()
    }
}

impl ProjectFlowScenario {
    /// Build a scenario that drives the browser through `launcher`
    pub fn new(config: FlowConfig, launcher: Arc<dyn BrowserLauncher>) -> FlowResult<Self> {
        config.validate()?;
        let api = ResourceApiClient::new(config.api.clone())?;
        Ok(Self {
            config,
            api,
            launcher,
        })
    }

    /// Build a scenario backed by a local Chromium
    pub fn with_chromium(config: FlowConfig) -> FlowResult<Self> {
        Self::new(config, Arc::new(ChromiumLauncher))
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Run the flow once
    ///
    /// Never panics on a failed check: the outcome is in [`ScenarioRun::result`]
    /// and the report records the state reached. A panic raised inside a
    /// browser step is re-raised after teardown and shutdown have run.
    pub async fn run(&self) -> ScenarioRun {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();
        let mut machine = ScenarioStateMachine::new(run_id);
        let mut progress = RunProgress::default();

        info!(
            run_id = %run_id,
            api = %self.api.base_url(),
            ui = %self.config.ui.base_url,
            "Starting project flow"
        );

        let result = match self.drive(&mut machine, &mut progress).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let err = match machine.current_state().next_step() {
                    Some(step) => err.at_step(step),
                    None => err,
                };
                error!(
                    run_id = %run_id,
                    state = %machine.current_state(),
                    "Project flow failed: {}",
                    err
                );
                if let Err(transition_err) =
                    machine.transition(ScenarioEvent::fail_with_error(err.to_string()))
                {
                    warn!(run_id = %run_id, "Could not record failure: {}", transition_err);
                }
                Err(err)
            }
        };

        let report = ScenarioReport {
            run_id,
            resource_id: progress.record.as_ref().map(ResourceRecord::resource_id),
            resource_title: progress.record.map(|record| record.title),
            final_state: machine.current_state(),
            transitions: machine.transitions().to_vec(),
            failure: result.as_ref().err().map(FailureSummary::from),
            teardown: progress.teardown,
            started_at,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        if report.passed() {
            info!(
                run_id = %run_id,
                elapsed_ms = report.elapsed_ms,
                "Project flow passed"
            );
        }

        ScenarioRun { report, result }
    }

    async fn drive(
        &self,
        machine: &mut ScenarioStateMachine,
        progress: &mut RunProgress,
    ) -> FlowResult<()> {
        let run_id = machine.run_id();

        let fixture = ResourceFixture::setup(&self.api, &self.config.fixture).await?;
        let record = fixture.record().clone();
        progress.record = Some(record.clone());
        machine.transition(ScenarioEvent::ResourceCreated {
            resource_id: record.resource_id(),
        })?;
        info!("{}", ScenarioStep::CreateResource.progress_message(&record.title));
        log_scenario_step(
            run_id,
            "create_resource",
            "passed",
            Some(record.resource_id()),
            None,
        );

        let browser_result = AssertUnwindSafe(self.verify_in_browser(machine, &record))
            .catch_unwind()
            .await;

        progress.teardown = Some(
            fixture
                .teardown(&self.api, self.config.fixture.cleanup)
                .await,
        );

        match browser_result {
            Ok(result) => result?,
            Err(payload) => panic::resume_unwind(payload),
        }
        machine.transition(ScenarioEvent::Finish)?;
        Ok(())
    }

    async fn verify_in_browser(
        &self,
        machine: &mut ScenarioStateMachine,
        record: &ResourceRecord,
    ) -> FlowResult<()> {
        let driver = self.launcher.launch(&self.config.browser).await?;
        let run_id = machine.run_id();
        let outcome = AssertUnwindSafe(self.browser_steps(driver.as_ref(), machine, record))
            .catch_unwind()
            .await;

        if let Err(e) = driver.shutdown().await {
            warn!(run_id = %run_id, "Browser shutdown failed: {}", e);
        }
        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    async fn browser_steps(
        &self,
        driver: &dyn BrowserDriver,
        machine: &mut ScenarioStateMachine,
        record: &ResourceRecord,
    ) -> FlowResult<()> {
        with_context(driver, ContextOptions::default(), move |primary| async move {
            with_mobile_context(driver, &self.config.mobile, move |mobile| async move {
                let run_id = machine.run_id();
                let resource_id = Some(record.resource_id());

                self.verify_ui(primary.as_ref()).await?;
                machine.transition(ScenarioEvent::UiVerified)?;
                info!("{}", ScenarioStep::VerifyUi.progress_message(&record.title));
                log_scenario_step(run_id, "verify_ui", "passed", resource_id, None);

                let width = self.verify_mobile(mobile.as_ref()).await?;
                machine.transition(ScenarioEvent::MobileVerified { width })?;
                info!("{}", ScenarioStep::VerifyMobile.progress_message(&record.title));
                log_scenario_step(
                    run_id,
                    "verify_mobile",
                    "passed",
                    resource_id,
                    Some(&format!("viewport width {width}")),
                );

                self.verify_isolation(driver, record).await?;
                machine.transition(ScenarioEvent::IsolationVerified)?;
                info!("{}", ScenarioStep::VerifyIsolation.progress_message(&record.title));
                log_scenario_step(run_id, "verify_isolation", "passed", resource_id, None);

                Ok(())
            })
            .await
        })
        .await
    }

    /// Dashboard heading visible on the UI base URL
    async fn verify_ui(&self, context: &dyn BrowserContext) -> FlowResult<()> {
        let page = context.new_page().await?;
        page.goto(&self.config.ui.base_url).await?;
        Expect::visibility(&self.config.ui)
            .to_be_visible(page.as_ref(), &self.config.ui.heading_selector)
            .await
    }

    /// Width the mobile page reports, once it matches the device profile
    async fn verify_mobile(&self, context: &dyn BrowserContext) -> FlowResult<u32> {
        let page = context.new_page().await?;
        page.goto(&self.config.ui.base_url).await?;
        let expected = self.config.mobile.width;
        viewport_width_equals(page.viewport_size().await?, expected)?;
        Ok(expected)
    }

    /// A context with no session must not see the resource on its project page
    async fn verify_isolation(
        &self,
        driver: &dyn BrowserDriver,
        record: &ResourceRecord,
    ) -> FlowResult<()> {
        let url = self.config.ui.project_url(record.resource_id());
        with_context(driver, ContextOptions::default(), move |intruder| async move {
            let page = intruder.new_page().await?;
            page.goto(&url).await?;
            Expect::assertion(&self.config.ui)
                .not_to_contain_text(page.as_ref(), &self.config.ui.body_selector, &record.title)
                .await
        })
        .await
    }
}
