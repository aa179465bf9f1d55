//! # callcheck-core
//!
//! Core types for callcheck, an end-to-end verification harness for a
//! two-party WebRTC voice-call page.
//!
//! ## Scenario shape
//!
//! - Two isolated browser sessions ("peers") share one browser process
//! - Joins are strictly sequential: peer 1 before peer 2
//! - Peer 1 calls peer 2 by the identifier the page assigned on join
//! - The verdict is the visibility of `#audio-container #audio-<calleeId>`
//!   on peer 1's page within a bounded wait
//!
//! Every wait in the scenario carries an explicit timeout and there is no
//! retry anywhere: a run either passes within its budgets or fails.

mod config;
mod error;
mod types;

pub use config::{BrowserSettings, ScenarioConfig, TimeoutConfig};
pub use error::{CallcheckError, Result};
pub use types::{PageContract, PeerId, PeerSlot, PhaseTiming, ScenarioReport, Verdict};
