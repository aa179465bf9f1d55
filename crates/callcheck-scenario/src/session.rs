//! The session surface the scenario drives
//!
//! `CallSession` is the narrow seam between phase sequencing and the
//! browser: everything the runner does to a peer goes through it, so the
//! ordering guarantees of the scenario can be exercised without a live
//! Chromium.

use async_trait::async_trait;
use callcheck_browser::{console, PeerSession};
use callcheck_core::{PeerSlot, Result};
use std::time::Duration;

/// One peer's handle on the page under test
#[async_trait]
pub trait CallSession: Send + Sync {
    fn slot(&self) -> PeerSlot;

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    fn install_console_hook(&self) -> Result<()>;

    /// Relay buffered in-page console output; never fails
    fn relay_console(&self);

    async fn click_button(&self, label: &str) -> Result<()>;

    async fn fill_labeled_input(&self, label: &str, value: &str) -> Result<()>;

    async fn wait_for_text_past_placeholder(
        &self,
        selector: &str,
        placeholder: &str,
        timeout: Duration,
    ) -> Result<Option<String>>;

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool>;

    fn capture_screenshot(&self) -> Result<Vec<u8>>;
}

#[async_trait]
impl CallSession for PeerSession {
    fn slot(&self) -> PeerSlot {
        PeerSession::slot(self)
    }

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        PeerSession::navigate(self, url, timeout).await
    }

    fn install_console_hook(&self) -> Result<()> {
        console::install_hook(self)
    }

    fn relay_console(&self) {
        console::relay(self)
    }

    async fn click_button(&self, label: &str) -> Result<()> {
        PeerSession::click_button(self, label).await
    }

    async fn fill_labeled_input(&self, label: &str, value: &str) -> Result<()> {
        PeerSession::fill_labeled_input(self, label, value).await
    }

    async fn wait_for_text_past_placeholder(
        &self,
        selector: &str,
        placeholder: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        PeerSession::wait_for_text_past_placeholder(self, selector, placeholder, timeout).await
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool> {
        PeerSession::wait_for_visible(self, selector, timeout).await
    }

    fn capture_screenshot(&self) -> Result<Vec<u8>> {
        PeerSession::capture_screenshot(self)
    }
}
