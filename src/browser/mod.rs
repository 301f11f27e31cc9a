//! # Browser Automation Seam
//!
//! The flow talks to the browser through four traits so the scenario can run
//! against Chromium in production and an in-memory recorder in tests:
//!
//! - [`BrowserLauncher`] starts a browser process
//! - [`BrowserDriver`] owns the process and creates isolated contexts
//! - [`BrowserContext`] is one cookie/storage/session scope
//! - [`BrowserPage`] is a tab inside a context
//!
//! [`with_context`] is the only way the scenario opens a context: the context
//! is closed exactly once on every exit path, including panics raised by an
//! assertion inside the body.

pub mod chromium;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::warn;

use crate::config::{BrowserSettings, DeviceProfile};
use crate::error::FlowResult;
use crate::logging::log_error;

pub use chromium::{ChromiumDriver, ChromiumLauncher};

/// Width and height of a page viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Options fixed at context creation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextOptions {
    /// Viewport override; `None` keeps the browser window size
    pub viewport: Option<ViewportSize>,
    pub user_agent: Option<String>,
    pub is_mobile: bool,
    pub device_scale_factor: Option<f64>,
}

impl ContextOptions {
    /// Options emulating `profile`
    pub fn for_device(profile: &DeviceProfile) -> Self {
        Self {
            viewport: Some(ViewportSize {
                width: profile.width,
                height: profile.height,
            }),
            user_agent: Some(profile.user_agent.clone()),
            is_mobile: profile.is_mobile,
            device_scale_factor: Some(profile.device_scale_factor),
        }
    }
}

/// Starts a browser process
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, settings: &BrowserSettings) -> FlowResult<Arc<dyn BrowserDriver>>;
}

/// A running browser able to create isolated contexts
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Create a context sharing no cookies, storage or session with any other
    async fn new_context(&self, options: ContextOptions) -> FlowResult<Arc<dyn BrowserContext>>;

    /// Dispose every context still open and stop the browser
    async fn shutdown(&self) -> FlowResult<()>;
}

/// One isolated session scope
#[async_trait]
pub trait BrowserContext: Send + Sync {
    fn context_id(&self) -> &str;

    fn options(&self) -> &ContextOptions;

    async fn new_page(&self) -> FlowResult<Arc<dyn BrowserPage>>;

    /// Release the context; calls after the first are no-ops
    async fn close(&self) -> FlowResult<()>;

    fn is_closed(&self) -> bool;
}

/// A page inside a context
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn goto(&self, url: &str) -> FlowResult<()>;

    /// Whether the first element matching `selector` is rendered with a non-empty box
    async fn is_visible(&self, selector: &str) -> FlowResult<bool>;

    /// Text content of the first element matching `selector`, `None` when absent
    async fn text_content(&self, selector: &str) -> FlowResult<Option<String>>;

    /// Viewport the page reports, `None` when it cannot be determined
    async fn viewport_size(&self) -> FlowResult<Option<ViewportSize>>;
}

/// Run `body` with a freshly created context and close it afterwards
///
/// The body's error wins over a close error; a close error after a successful
/// body is returned. A panic in the body is re-raised after closing.
pub async fn with_context<T, F, Fut>(
    driver: &dyn BrowserDriver,
    options: ContextOptions,
    body: F,
) -> FlowResult<T>
where
    F: FnOnce(Arc<dyn BrowserContext>) -> Fut,
    Fut: Future<Output = FlowResult<T>>,
{
    let context = driver.new_context(options).await?;
    let outcome = AssertUnwindSafe(body(Arc::clone(&context)))
        .catch_unwind()
        .await;
    let closed = context.close().await;

    match outcome {
        Ok(Ok(value)) => {
            closed?;
            Ok(value)
        }
        Ok(Err(err)) => {
            if let Err(close_err) = closed {
                log_error(
                    "browser",
                    "close_context",
                    &close_err.to_string(),
                    Some(context.context_id()),
                );
            }
            Err(err)
        }
        Err(panic) => {
            if let Err(close_err) = closed {
                warn!(
                    context_id = context.context_id(),
                    "Failed to close context after panic: {}", close_err
                );
            }
            std::panic::resume_unwind(panic)
        }
    }
}
