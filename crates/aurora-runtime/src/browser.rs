//! The browser driver behind `web_navigate`/`web_click`/`web_type`/
//! `web_extract`/`screenshot`.
//!
//! Grounded on `headless_chrome` (the real crate
//! `examples/other_examples/manifests/stencila-stencila` depends on for
//! the same job: driving a real Chrome/Chromium instance over CDP).
//! `headless_chrome`'s API is synchronous — it runs its own WebSocket
//! thread internally — so every call here goes through
//! `tokio::task::spawn_blocking`.

use std::sync::Arc;
use std::time::Duration;

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, Tab};
use tokio::sync::Mutex;

use crate::error::{RuntimeError, RuntimeResult};

/// Lazily-started Chrome instance shared by every `web_*`/`screenshot`
/// action in one executor.
pub struct BrowserDriver {
    tab: Mutex<Option<Arc<Tab>>>,
}

impl BrowserDriver {
    /// Build a driver that starts Chrome on first use.
    #[must_use]
    pub fn new() -> Self {
        Self { tab: Mutex::new(None) }
    }

    async fn tab(&self) -> RuntimeResult<Arc<Tab>> {
        let mut guard = self.tab.lock().await;
        if let Some(tab) = guard.as_ref() {
            return Ok(Arc::clone(tab));
        }

        let tab = tokio::task::spawn_blocking(|| -> Result<Arc<Tab>, String> {
            let browser = Browser::default().map_err(|err| err.to_string())?;
            let tab = browser.new_tab().map_err(|err| err.to_string())?;
            // Keep the Browser handle alive for the process lifetime by
            // leaking it: headless_chrome tears the browser down when its
            // handle drops, and this driver has no natural shutdown point
            // short of process exit or an explicit `close`.
            std::mem::forget(browser);
            Ok(tab)
        })
        .await
        .map_err(|err| RuntimeError::Browser(err.to_string()))?
        .map_err(RuntimeError::Browser)?;

        *guard = Some(Arc::clone(&tab));
        Ok(tab)
    }

    /// Navigate to `url`, wait for navigation to settle, then sleep
    /// `wait_ms` before returning the resulting title.
    pub async fn navigate(&self, url: &str, wait_ms: Option<u64>) -> RuntimeResult<(String, String)> {
        let tab = self.tab().await?;
        let url = url.to_string();
        let (final_url, title) = tokio::task::spawn_blocking(move || -> Result<(String, String), String> {
            tab.navigate_to(&url).map_err(|err| err.to_string())?;
            tab.wait_until_navigated().map_err(|err| err.to_string())?;
            let title = tab.get_title().map_err(|err| err.to_string())?;
            Ok((tab.get_url(), title))
        })
        .await
        .map_err(|err| RuntimeError::Browser(err.to_string()))?
        .map_err(RuntimeError::Browser)?;

        if let Some(ms) = wait_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        Ok((final_url, title))
    }

    /// Click the first element matching `selector`.
    pub async fn click(&self, selector: &str) -> RuntimeResult<()> {
        let tab = self.tab().await?;
        let selector = selector.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), String> {
            let element = tab.wait_for_element(&selector).map_err(|err| err.to_string())?;
            element.click().map_err(|err| err.to_string())?;
            Ok(())
        })
        .await
        .map_err(|err| RuntimeError::Browser(err.to_string()))?
        .map_err(RuntimeError::Browser)
    }

    /// Type `text` into the first element matching `selector`.
    pub async fn type_into(&self, selector: &str, text: &str) -> RuntimeResult<()> {
        let tab = self.tab().await?;
        let selector = selector.to_string();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), String> {
            let element = tab.wait_for_element(&selector).map_err(|err| err.to_string())?;
            element.type_into(&text).map_err(|err| err.to_string())?;
            Ok(())
        })
        .await
        .map_err(|err| RuntimeError::Browser(err.to_string()))?
        .map_err(RuntimeError::Browser)
    }

    /// Read the inner text of the first element matching `selector`.
    pub async fn extract(&self, selector: &str) -> RuntimeResult<String> {
        let tab = self.tab().await?;
        let selector = selector.to_string();
        tokio::task::spawn_blocking(move || -> Result<String, String> {
            let element = tab.wait_for_element(&selector).map_err(|err| err.to_string())?;
            element.get_inner_text().map_err(|err| err.to_string())
        })
        .await
        .map_err(|err| RuntimeError::Browser(err.to_string()))?
        .map_err(RuntimeError::Browser)
    }

    /// Capture a full-page PNG screenshot, returning the raw bytes.
    pub async fn screenshot_png(&self) -> RuntimeResult<Vec<u8>> {
        let tab = self.tab().await?;
        tokio::task::spawn_blocking(move || -> Result<Vec<u8>, String> {
            tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
                .map_err(|err| err.to_string())
        })
        .await
        .map_err(|err| RuntimeError::Browser(err.to_string()))?
        .map_err(RuntimeError::Browser)
    }
}

impl Default for BrowserDriver {
    fn default() -> Self {
        Self::new()
    }
}
