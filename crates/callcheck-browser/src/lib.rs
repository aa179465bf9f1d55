//! # callcheck-browser
//!
//! Browser automation over Chrome DevTools Protocol for the callcheck
//! verification harness.
//!
//! # Features
//!
//! - **Harness**: one Chromium process per run, launched with fake media
//!   devices so WebRTC negotiation works without hardware
//! - **Peer sessions**: isolated browser contexts modeling distinct users
//! - **Bounded waits**: every poll carries an explicit timeout; nothing
//!   blocks indefinitely
//! - **Console capture**: in-page log lines relayed per peer for debugging
//!
//! # Example
//!
//! ```no_run
//! use callcheck_browser::BrowserHarness;
//! use callcheck_core::{BrowserSettings, PeerSlot};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let harness = BrowserHarness::launch(BrowserSettings::default()).await?;
//!
//!     let peer = harness
//!         .new_peer_session(PeerSlot::Caller, Duration::from_millis(250))
//!         .await?;
//!     peer.navigate("http://localhost:8000/test-voice.html", Duration::from_secs(10))
//!         .await?;
//!     peer.click_button("Join").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Requirements
//!
//! - Chrome or Chromium installed; the page's media negotiation is driven
//!   entirely by the fake-device flags, no microphone needed

pub mod browser;
pub mod console;
pub mod error;

// Re-export commonly used types
pub use browser::{BrowserHarness, PeerSession};
pub use error::{CallcheckError, Result};
