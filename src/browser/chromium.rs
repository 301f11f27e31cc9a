//! # Chromium Driver
//!
//! [`BrowserDriver`] over the Chrome DevTools Protocol using `chromiumoxide`.
//! Each [`BrowserContext`] maps onto a CDP browser context, which gives it its
//! own cookie jar, storage and cache. Viewport and user agent overrides are
//! applied to every page created inside the context.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use dashmap::DashMap;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{
    BrowserContext, BrowserDriver, BrowserLauncher, BrowserPage, ContextOptions, ViewportSize,
};
use crate::config::BrowserSettings;
use crate::error::{FlowError, FlowResult};
use crate::logging::log_context_operation;

/// Launches a local Chrome/Chromium
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumLauncher;

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, settings: &BrowserSettings) -> FlowResult<Arc<dyn BrowserDriver>> {
        Ok(Arc::new(ChromiumDriver::launch(settings).await?))
    }
}

type ContextRegistry = DashMap<String, BrowserContextId>;

/// A running Chromium process
pub struct ChromiumDriver {
    browser: Arc<Mutex<Browser>>,
    handler: parking_lot::Mutex<Option<JoinHandle<()>>>,
    open_contexts: Arc<ContextRegistry>,
    shut_down: AtomicBool,
}

impl std::fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("open_contexts", &self.open_contexts.len())
            .field("shut_down", &self.shut_down.load(Ordering::SeqCst))
            .finish()
    }
}

impl ChromiumDriver {
    /// Launch a browser process and spawn its CDP handler
    pub async fn launch(settings: &BrowserSettings) -> FlowResult<Self> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(settings.request_timeout_ms));

        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(FlowError::browser)?;
        let (browser, mut handler) = Browser::launch(config).await?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                // Unknown CDP messages from newer Chrome builds are not fatal
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
        });

        info!(
            headless = settings.headless,
            sandbox = settings.sandbox,
            "Launched Chromium"
        );

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            handler: parking_lot::Mutex::new(Some(handler_task)),
            open_contexts: Arc::new(DashMap::new()),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Number of contexts created and not yet closed
    pub fn open_context_count(&self) -> usize {
        self.open_contexts.len()
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn new_context(&self, options: ContextOptions) -> FlowResult<Arc<dyn BrowserContext>> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(FlowError::browser("browser has been shut down"));
        }

        let id = {
            let browser = self.browser.lock().await;
            let response = browser
                .execute(CreateBrowserContextParams::default())
                .await?;
            response.result.browser_context_id.clone()
        };
        let key = id.inner().clone();
        self.open_contexts.insert(key.clone(), id.clone());
        log_context_operation("create", &key, None);

        Ok(Arc::new(ChromiumContext {
            key,
            id,
            options,
            browser: Arc::clone(&self.browser),
            registry: Arc::clone(&self.open_contexts),
            closed: AtomicBool::new(false),
        }))
    }

    async fn shutdown(&self) -> FlowResult<()> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let leaked: Vec<String> = self
            .open_contexts
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        let mut browser = self.browser.lock().await;
        for key in leaked {
            if let Some((_, id)) = self.open_contexts.remove(&key) {
                warn!(context_id = %key, "Disposing context left open at shutdown");
                if let Err(e) = browser.execute(DisposeBrowserContextParams::new(id)).await {
                    warn!(context_id = %key, "Failed to dispose context: {}", e);
                }
            }
        }

        browser.close().await?;
        if let Err(e) = browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        drop(browser);

        if let Some(handle) = self.handler.lock().take() {
            handle.abort();
        }

        info!("Chromium shut down");
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handler.get_mut().take() {
            handle.abort();
        }
    }
}

/// A CDP browser context
struct ChromiumContext {
    key: String,
    id: BrowserContextId,
    options: ContextOptions,
    browser: Arc<Mutex<Browser>>,
    registry: Arc<ContextRegistry>,
    closed: AtomicBool,
}

impl ChromiumContext {
    async fn apply_options(&self, page: &Page) -> FlowResult<()> {
        if let Some(viewport) = self.options.viewport {
            let metrics = SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(viewport.width))
                .height(i64::from(viewport.height))
                .device_scale_factor(self.options.device_scale_factor.unwrap_or(1.0))
                .mobile(self.options.is_mobile)
                .build()
                .map_err(FlowError::browser)?;
            page.execute(metrics).await?;
        }

        if let Some(ref user_agent) = self.options.user_agent {
            page.execute(SetUserAgentOverrideParams::new(user_agent.clone()))
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl BrowserContext for ChromiumContext {
    fn context_id(&self) -> &str {
        &self.key
    }

    fn options(&self) -> &ContextOptions {
        &self.options
    }

    async fn new_page(&self) -> FlowResult<Arc<dyn BrowserPage>> {
        if self.is_closed() {
            return Err(FlowError::ContextClosed {
                context_id: self.key.clone(),
            });
        }

        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.id.clone())
            .build()
            .map_err(FlowError::browser)?;

        let page = {
            let browser = self.browser.lock().await;
            browser.new_page(params).await?
        };
        self.apply_options(&page).await?;
        log_context_operation("new_page", &self.key, None);

        Ok(Arc::new(ChromiumPage { page }))
    }

    async fn close(&self) -> FlowResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // Already disposed by a driver shutdown
        if self.registry.remove(&self.key).is_none() {
            return Ok(());
        }

        let browser = self.browser.lock().await;
        browser
            .execute(DisposeBrowserContextParams::new(self.id.clone()))
            .await?;
        log_context_operation("close", &self.key, None);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

const VISIBILITY_SCRIPT: &str = r#"(selector) => {
    const el = document.querySelector(selector);
    if (!el) { return false; }
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden';
}"#;

const TEXT_SCRIPT: &str = r#"(selector) => {
    const el = document.querySelector(selector);
    return el ? { found: true, text: el.textContent || '' } : { found: false, text: '' };
}"#;

const VIEWPORT_SCRIPT: &str = "({ width: window.innerWidth, height: window.innerHeight })";

#[derive(Debug, Deserialize)]
struct TextLookup {
    found: bool,
    text: String,
}

/// A CDP page
struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    /// `(script)(selector)` with the selector passed as a JSON string literal
    fn call_with_selector(script: &str, selector: &str) -> FlowResult<String> {
        let literal = serde_json::to_string(selector)?;
        Ok(format!("({script})({literal})"))
    }

    /// Evaluate `expression` as a plain expression and deserialize its value
    async fn eval<T: DeserializeOwned>(&self, expression: String) -> FlowResult<T> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .build()
            .map_err(FlowError::browser)?;
        Ok(self.page.evaluate_expression(params).await?.into_value()?)
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str) -> FlowResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| FlowError::navigation(url, e.to_string()))?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> FlowResult<bool> {
        let expression = Self::call_with_selector(VISIBILITY_SCRIPT, selector)?;
        self.eval(expression).await
    }

    async fn text_content(&self, selector: &str) -> FlowResult<Option<String>> {
        let expression = Self::call_with_selector(TEXT_SCRIPT, selector)?;
        let lookup: TextLookup = self.eval(expression).await?;
        Ok(lookup.found.then_some(lookup.text))
    }

    async fn viewport_size(&self) -> FlowResult<Option<ViewportSize>> {
        let size: ViewportSize = self.eval(VIEWPORT_SCRIPT.to_string()).await?;
        Ok(Some(size))
    }
}
