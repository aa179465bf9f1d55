//! Browser lifecycle management using Chrome DevTools Protocol
//!
//! One browser process per run, shared by the peer sessions. Each peer gets
//! its own browser context (separate cookie/storage jar), so the two
//! sessions only share state through the signaling channel the page uses.

use crate::error::Result;
use callcheck_core::{BrowserSettings, CallcheckError, PeerSlot};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Extra Chromium switches derived from the launch settings
fn chrome_args(settings: &BrowserSettings) -> Vec<&'static OsStr> {
    let mut args = Vec::new();
    if settings.fake_media {
        // Auto-grant getUserMedia and synthesize a capture device, so the
        // page's media negotiation succeeds without real hardware.
        args.push(OsStr::new("--use-fake-ui-for-media-stream"));
        args.push(OsStr::new("--use-fake-device-for-media-stream"));
    }
    args
}

/// Owns the single browser process for a scenario run
///
/// Dropping the harness kills the browser, so cleanup happens on every exit
/// path without explicit teardown code.
pub struct BrowserHarness {
    browser: Browser,
}

impl BrowserHarness {
    /// Launch a browser process with the given settings
    pub async fn launch(settings: BrowserSettings) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, fake media: {}, sandbox: {}, size: {}x{})",
            settings.headless,
            settings.fake_media,
            settings.sandbox,
            settings.window_width,
            settings.window_height
        );

        let launch_options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .sandbox(settings.sandbox)
            .window_size(Some((settings.window_width, settings.window_height)))
            .args(chrome_args(&settings))
            .build()
            .map_err(|e| CallcheckError::Browser(format!("Invalid launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| CallcheckError::Browser(format!("Failed to launch browser: {}", e)))?;

        info!("Browser launched successfully");

        Ok(Self { browser })
    }

    /// Create an isolated session for one peer
    ///
    /// The session lives in its own browser context with one tab. The two
    /// contexts of a run never share cookies or storage.
    pub async fn new_peer_session(
        &self,
        slot: PeerSlot,
        poll_interval: Duration,
    ) -> Result<PeerSession> {
        debug!("Creating isolated context for {}", slot);

        let context = self
            .browser
            .new_context()
            .map_err(|e| CallcheckError::Browser(format!("Failed to create context for {}: {}", slot, e)))?;

        let context_id = context.get_id().to_string();

        let tab = context
            .new_tab()
            .map_err(|e| CallcheckError::Browser(format!("Failed to create tab for {}: {}", slot, e)))?;

        info!("Created session for {} (context {})", slot, context_id);

        Ok(PeerSession {
            slot,
            tab,
            poll_interval,
        })
    }
}

/// One simulated user: an isolated browsing context driving the test page
pub struct PeerSession {
    slot: PeerSlot,
    tab: Arc<Tab>,
    poll_interval: Duration,
}

impl PeerSession {
    pub fn slot(&self) -> PeerSlot {
        self.slot
    }

    /// Navigate to a URL and wait for the load to complete
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        debug!("{}: navigating to {}", self.slot, url);

        self.tab.set_default_timeout(timeout);

        self.tab.navigate_to(url).map_err(|e| {
            CallcheckError::Browser(format!("{}: failed to start navigation to {}: {}", self.slot, url, e))
        })?;

        self.tab
            .wait_until_navigated()
            .map_err(|_e| CallcheckError::NavigationTimeout {
                peer: self.slot.label().to_string(),
                url: url.to_string(),
            })?;

        info!("{}: loaded {}", self.slot, url);
        Ok(())
    }

    /// Click a button by its visible text
    pub async fn click_button(&self, label: &str) -> Result<()> {
        debug!("{}: clicking button '{}'", self.slot, label);

        let xpath = button_xpath(label);
        let element = self.tab.wait_for_xpath(&xpath).map_err(|_e| {
            CallcheckError::PageContract(format!("{}: no button labeled '{}'", self.slot, label))
        })?;

        element.click().map_err(|e| {
            CallcheckError::Browser(format!("{}: failed to click '{}': {}", self.slot, label, e))
        })?;

        Ok(())
    }

    /// Fill the text input associated with a label
    ///
    /// Resolves the input either through the label's `for` attribute or as a
    /// descendant of the label element.
    pub async fn fill_labeled_input(&self, label: &str, value: &str) -> Result<()> {
        debug!("{}: filling input labeled '{}'", self.slot, label);

        for xpath in labeled_input_xpaths(label) {
            if let Ok(element) = self.tab.find_element_by_xpath(&xpath) {
                element.click().map_err(|e| {
                    CallcheckError::Browser(format!("{}: failed to focus input '{}': {}", self.slot, label, e))
                })?;
                element.type_into(value).map_err(|e| {
                    CallcheckError::Browser(format!("{}: failed to type into '{}': {}", self.slot, label, e))
                })?;
                return Ok(());
            }
        }

        Err(CallcheckError::PageContract(format!(
            "{}: no text input labeled '{}'",
            self.slot, label
        )))
    }

    /// Execute JavaScript in the page context
    pub fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self.tab.evaluate(script, false).map_err(|e| {
            CallcheckError::Browser(format!("{}: script evaluation failed: {}", self.slot, e))
        })?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Text content of the first element matching a selector
    pub fn text_content(&self, selector: &str) -> Result<String> {
        let script = format!("document.querySelector('{}')?.textContent ?? ''", selector);
        let result = self.evaluate(&script)?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Whether an element matching the selector is rendered and visible
    pub fn is_visible(&self, selector: &str) -> Result<bool> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector('{}');
                if (!el) {{ return false; }}
                const style = window.getComputedStyle(el);
                if (style.display === 'none' || style.visibility === 'hidden') {{ return false; }}
                return el.offsetWidth > 0 || el.offsetHeight > 0 || el.getClientRects().length > 0;
            }})()"#,
            selector
        );

        let result = self.evaluate(&script)?;
        Ok(result.as_bool().unwrap_or(false))
    }

    /// Poll a selector's text until it is non-empty and differs from a
    /// placeholder, within a bounded timeout
    ///
    /// Returns the settled text, or `None` if the deadline passed. In-page
    /// console output is relayed between polls.
    pub async fn wait_for_text_past_placeholder(
        &self,
        selector: &str,
        placeholder: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        debug!(
            "{}: waiting for {} to leave placeholder '{}' (timeout {:?})",
            self.slot, selector, placeholder, timeout
        );

        let deadline = Instant::now() + timeout;
        loop {
            let text = self.text_content(selector)?;
            let trimmed = text.trim();
            if !trimmed.is_empty() && trimmed != placeholder {
                return Ok(Some(trimmed.to_string()));
            }

            crate::console::relay(self);

            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(self.poll_interval).await;
        }
    }

    /// Poll until an element is visible, within a bounded timeout
    ///
    /// Returns whether the element became visible before the deadline.
    pub async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool> {
        debug!("{}: waiting for {} to be visible (timeout {:?})", self.slot, selector, timeout);

        let deadline = Instant::now() + timeout;
        loop {
            if self.is_visible(selector)? {
                debug!("{}: {} is visible", self.slot, selector);
                return Ok(true);
            }

            crate::console::relay(self);

            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.poll_interval).await;
        }
    }

    /// Capture a full-page PNG screenshot
    pub fn capture_screenshot(&self) -> Result<Vec<u8>> {
        debug!("{}: capturing screenshot", self.slot);

        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| CallcheckError::Screenshot(format!("{}: capture failed: {}", self.slot, e)))
    }
}

/// XPath for a button by its visible text
fn button_xpath(label: &str) -> String {
    format!(r#"//button[normalize-space(.)="{}"]"#, label)
}

/// Candidate XPaths for a text input associated with a label, in order:
/// `for`-attribute association, then input nested inside the label
fn labeled_input_xpaths(label: &str) -> [String; 2] {
    [
        format!(r#"//input[@id = //label[normalize-space(.)="{}"]/@for]"#, label),
        format!(r#"//label[normalize-space(.)="{}"]//input"#, label),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_args_fake_media() {
        let settings = BrowserSettings::default();
        let args = chrome_args(&settings);
        assert!(args.contains(&OsStr::new("--use-fake-ui-for-media-stream")));
        assert!(args.contains(&OsStr::new("--use-fake-device-for-media-stream")));
    }

    #[test]
    fn test_chrome_args_without_fake_media() {
        let settings = BrowserSettings {
            fake_media: false,
            ..BrowserSettings::default()
        };
        assert!(chrome_args(&settings).is_empty());
    }

    #[test]
    fn test_button_xpath_handles_plain_labels() {
        assert_eq!(button_xpath("Join"), r#"//button[normalize-space(.)="Join"]"#);
        assert_eq!(button_xpath("Call"), r#"//button[normalize-space(.)="Call"]"#);
    }

    #[test]
    fn test_labeled_input_xpaths_preserve_apostrophes() {
        // The label on the test page contains an apostrophe, so the XPath
        // string literals must be double-quoted.
        let [by_for, nested] = labeled_input_xpaths("Peer's ID to Call:");
        assert!(by_for.contains(r#""Peer's ID to Call:""#));
        assert!(nested.contains(r#""Peer's ID to Call:""#));
        assert!(by_for.contains("@for"));
    }
}
