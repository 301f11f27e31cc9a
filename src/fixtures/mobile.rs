//! Mobile-context fixture.
//!
//! Yields a context emulating the configured device (iPhone 13 Pro by
//! default: 390x844 viewport and a Mobile Safari user agent) and closes it
//! when the body finishes, however it finishes.

use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::browser::{with_context, BrowserContext, BrowserDriver, ContextOptions};
use crate::config::DeviceProfile;
use crate::error::FlowResult;

/// Run `body` inside a fresh context emulating `profile`
pub async fn with_mobile_context<T, F, Fut>(
    driver: &dyn BrowserDriver,
    profile: &DeviceProfile,
    body: F,
) -> FlowResult<T>
where
    F: FnOnce(Arc<dyn BrowserContext>) -> Fut,
    Fut: Future<Output = FlowResult<T>>,
{
    debug!(
        device = %profile.name,
        width = profile.width,
        height = profile.height,
        "Opening mobile context"
    );
    with_context(driver, ContextOptions::for_device(profile), body).await
}
