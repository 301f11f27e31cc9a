//! # Retrying Expectations
//!
//! Assertions against a live page retry until they hold or the deadline
//! passes. A deadline miss becomes [`FlowError::ExpectationTimeout`]; nothing
//! here retries past its deadline.

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::browser::{BrowserPage, ViewportSize};
use crate::config::UiConfig;
use crate::error::{FlowError, FlowResult};

/// Deadline and polling cadence for one expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expect {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Expect {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Deadline for visibility checks
    pub fn visibility(ui: &UiConfig) -> Self {
        Self::new(ui.visibility_timeout(), ui.poll_interval())
    }

    /// Deadline for the remaining assertions
    pub fn assertion(ui: &UiConfig) -> Self {
        Self::new(ui.assertion_timeout(), ui.poll_interval())
    }

    /// Element matching `selector` becomes visible
    pub async fn to_be_visible(&self, page: &dyn BrowserPage, selector: &str) -> FlowResult<()> {
        let expectation = format!("'{selector}' to be visible");
        self.poll(&expectation, move || async move { page.is_visible(selector).await })
            .await
    }

    /// Element matching `selector` does not contain `needle` in its text
    ///
    /// A missing element counts as not containing the text.
    pub async fn not_to_contain_text(
        &self,
        page: &dyn BrowserPage,
        selector: &str,
        needle: &str,
    ) -> FlowResult<()> {
        let expectation = format!("'{selector}' not to contain text \"{needle}\"");
        self.poll(&expectation, move || async move {
            let text = page.text_content(selector).await?;
            Ok(!text.is_some_and(|text| text.contains(needle)))
        })
        .await
    }

    /// Run `check` until it returns `true` or the deadline passes
    ///
    /// A check error counts as "not yet": pages mid-navigation reject script
    /// evaluation transiently. The most recent error is kept for the timeout.
    async fn poll<F, Fut>(&self, expectation: &str, mut check: F) -> FlowResult<()>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = FlowResult<bool>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut attempts: u32 = 0;
        let mut last_error: Option<FlowError> = None;

        loop {
            attempts += 1;
            match check().await {
                Ok(true) => {
                    debug!(attempts, "Expectation met: {}", expectation);
                    return Ok(());
                }
                Ok(false) => last_error = None,
                Err(e) => {
                    debug!(attempts, "Expectation check failed, retrying: {}", e);
                    last_error = Some(e);
                }
            }
            if Instant::now() >= deadline {
                let expectation = match last_error {
                    Some(e) => format!("{expectation} (last error: {e})"),
                    None => expectation.to_string(),
                };
                return Err(FlowError::ExpectationTimeout {
                    expectation,
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}

/// The reported viewport width must be exactly `expected`
pub fn viewport_width_equals(actual: Option<ViewportSize>, expected: u32) -> FlowResult<()> {
    match actual {
        Some(size) if size.width == expected => Ok(()),
        Some(size) => Err(FlowError::assertion(
            format!("viewport width {expected}"),
            size.width.to_string(),
        )),
        None => Err(FlowError::assertion(
            format!("viewport width {expected}"),
            "no viewport reported",
        )),
    }
}
