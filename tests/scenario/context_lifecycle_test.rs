//! # Browser Context Lifecycle Tests
//!
//! Every context the flow opens must be closed exactly once, whichever way
//! the step that owns it ends.

use anyhow::Result;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use projectflow::browser::{
    with_context, BrowserContext, BrowserLauncher, ContextOptions, ViewportSize,
};
use projectflow::config::{BrowserSettings, CleanupPolicy, DeviceProfile};
use projectflow::constants::mobile;
use projectflow::error::{FlowError, FlowResult};
use projectflow::fixtures::with_mobile_context;
use projectflow::scenario::ProjectFlowScenario;

use super::{test_config, TEST_UI_URL};
use crate::common::mock_browser::{PageBehavior, RecordingLauncher};
use crate::common::stub_api::StubApi;

#[tokio::test]
async fn test_contexts_closed_once_after_passing_run() -> Result<()> {
    let api = StubApi::start().await;
    let launcher = Arc::new(RecordingLauncher::new(PageBehavior::default()));
    let log = launcher.log();

    let scenario = ProjectFlowScenario::new(test_config(&api.base_url), launcher)?;
    scenario.run().await.into_result()?;

    assert_eq!(log.contexts().len(), 3);
    assert!(log.every_context_closed_once(), "{:?}", log.contexts());

    api.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_contexts_closed_once_after_each_failure() -> Result<()> {
    let failures = [
        PageBehavior {
            heading_visible: false,
            ..Default::default()
        },
        PageBehavior {
            viewport_override: Some(ViewportSize {
                width: 1024,
                height: 768,
            }),
            ..Default::default()
        },
        PageBehavior {
            project_page_text: Some("Integration Test Project".to_string()),
            ..Default::default()
        },
    ];

    for behavior in failures {
        let api = StubApi::start().await;
        let launcher = Arc::new(RecordingLauncher::new(behavior.clone()));
        let log = launcher.log();

        let scenario = ProjectFlowScenario::new(test_config(&api.base_url), launcher)?;
        let run = scenario.run().await;

        assert!(run.result.is_err(), "expected failure for {behavior:?}");
        assert!(!log.contexts().is_empty());
        assert!(log.every_context_closed_once(), "{:?}", log.contexts());
        assert_eq!(log.shutdowns(), 1);

        api.shutdown().await;
    }
    Ok(())
}

#[tokio::test]
async fn test_contexts_closed_once_when_page_panics() -> Result<()> {
    let api = StubApi::start().await;
    let launcher = Arc::new(RecordingLauncher::new(PageBehavior {
        panic_on_url: Some("/projects/".to_string()),
        ..Default::default()
    }));
    let log = launcher.log();

    let scenario = ProjectFlowScenario::new(test_config(&api.base_url), launcher)?;
    let outcome = AssertUnwindSafe(scenario.run()).catch_unwind().await;

    assert!(outcome.is_err(), "panic must propagate to the caller");
    assert_eq!(log.contexts().len(), 3);
    assert!(log.every_context_closed_once(), "{:?}", log.contexts());

    api.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_panicking_step_still_tears_down_and_shuts_down() -> Result<()> {
    let api = StubApi::start().await;
    let launcher = Arc::new(RecordingLauncher::new(PageBehavior {
        panic_on_url: Some("/projects/".to_string()),
        ..Default::default()
    }));
    let log = launcher.log();

    let mut config = test_config(&api.base_url);
    config.fixture.cleanup = CleanupPolicy::Delete;
    let scenario = ProjectFlowScenario::new(config, launcher)?;
    let outcome = AssertUnwindSafe(scenario.run()).catch_unwind().await;

    assert!(outcome.is_err(), "panic must propagate to the caller");
    assert_eq!(api.deleted(), vec![123], "resource deleted before re-raising");
    assert_eq!(log.launches(), 1);
    assert_eq!(log.shutdowns(), 1);
    assert!(log.every_context_closed_once(), "{:?}", log.contexts());

    api.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_mobile_context_emulates_device() -> Result<()> {
    let api = StubApi::start().await;
    let launcher = Arc::new(RecordingLauncher::new(PageBehavior::default()));
    let log = launcher.log();

    let scenario = ProjectFlowScenario::new(test_config(&api.base_url), launcher)?;
    scenario.run().await.into_result()?;

    let contexts = log.contexts();
    let mobile_contexts: Vec<_> = contexts
        .iter()
        .filter(|c| c.options.viewport.is_some())
        .collect();
    assert_eq!(mobile_contexts.len(), 1);

    let options = &mobile_contexts[0].options;
    assert_eq!(
        options.viewport,
        Some(ViewportSize {
            width: 390,
            height: 844
        })
    );
    assert_eq!(options.user_agent.as_deref(), Some(mobile::USER_AGENT));

    api.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_isolation_context_is_fresh_and_targets_project_page() -> Result<()> {
    let api = StubApi::start().await;
    let launcher = Arc::new(RecordingLauncher::new(PageBehavior::default()));
    let log = launcher.log();

    let scenario = ProjectFlowScenario::new(test_config(&api.base_url), launcher)?;
    scenario.run().await.into_result()?;

    let project_url = format!("{TEST_UI_URL}/projects/123");
    let navigations = log.navigations();
    let to_project: Vec<_> = navigations.iter().filter(|n| n.url == project_url).collect();
    assert_eq!(to_project.len(), 1);

    // The intruder context did nothing but open the project page
    let intruder_id = &to_project[0].context_id;
    assert_eq!(
        navigations
            .iter()
            .filter(|n| &n.context_id == intruder_id)
            .count(),
        1
    );
    let intruder = log
        .contexts()
        .into_iter()
        .find(|c| &c.id == intruder_id)
        .expect("intruder context recorded");
    assert_eq!(intruder.options, ContextOptions::default());

    api.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_with_context_closes_on_body_error() {
    let launcher = RecordingLauncher::new(PageBehavior::default());
    let log = launcher.log();
    let driver = launcher
        .launch(&BrowserSettings::default())
        .await
        .expect("recording launch");

    let result: Result<(), FlowError> =
        with_context(driver.as_ref(), ContextOptions::default(), |_context| async {
            Err(FlowError::browser("step blew up"))
        })
        .await;

    assert!(matches!(result, Err(FlowError::Browser(_))));
    assert!(log.every_context_closed_once());
}

async fn panicking_step(context: Arc<dyn BrowserContext>) -> FlowResult<()> {
    assert!(!context.is_closed());
    panic!("assertion failed inside mobile step");
}

#[tokio::test]
async fn test_nested_fixture_contexts_close_on_panic() {
    let launcher = RecordingLauncher::new(PageBehavior::default());
    let log = launcher.log();
    let driver = launcher
        .launch(&BrowserSettings::default())
        .await
        .expect("recording launch");
    let driver_ref = driver.as_ref();
    let profile = DeviceProfile::default();
    let profile_ref = &profile;

    let outcome = AssertUnwindSafe(with_context(
        driver_ref,
        ContextOptions::default(),
        move |_outer| async move {
            with_mobile_context(driver_ref, profile_ref, panicking_step).await
        },
    ))
    .catch_unwind()
    .await;

    assert!(outcome.is_err());
    assert_eq!(log.contexts().len(), 2);
    assert!(log.every_context_closed_once());
}
