//! Core type definitions for the call verification scenario

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CallcheckError, Result};

/// Opaque peer identifier assigned by the page's signaling layer after join
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Parse an identifier from the page's display text.
    ///
    /// The display text is trimmed; an empty result is rejected because an
    /// assigned identifier is always non-empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CallcheckError::PageContract(
                "identifier display was empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the call a session plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerSlot {
    /// Peer 1: joins first, places the call, hosts the verification view
    Caller,
    /// Peer 2: joins second, receives the call
    Callee,
}

impl PeerSlot {
    /// Short label used to tag log lines and diagnostic artifacts
    pub fn label(&self) -> &'static str {
        match self {
            Self::Caller => "peer1",
            Self::Callee => "peer2",
        }
    }
}

impl std::fmt::Display for PeerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for PeerSlot {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "peer1" | "caller" => Ok(Self::Caller),
            "peer2" | "callee" => Ok(Self::Callee),
            _ => Err(format!("Invalid peer slot: {}", s)),
        }
    }
}

/// Selector contract of the page under test
///
/// Everything the runner touches on the page is enumerated here, so an
/// alternate page layout can be substituted without touching orchestration
/// logic. Defaults match `test-voice.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContract {
    /// Visible text of the join button
    #[serde(default = "default_join_button")]
    pub join_button_label: String,

    /// Visible text of the call button
    #[serde(default = "default_call_button")]
    pub call_button_label: String,

    /// CSS selector of the element that displays this session's identifier
    #[serde(default = "default_id_display")]
    pub id_display_selector: String,

    /// Placeholder shown in the identifier display before the session joins
    #[serde(default = "default_id_placeholder")]
    pub id_placeholder_text: String,

    /// Label text of the input that takes the remote peer's identifier
    #[serde(default = "default_peer_input_label")]
    pub peer_input_label: String,

    /// CSS selector of the container that gains one child per remote stream
    #[serde(default = "default_audio_container")]
    pub audio_container_selector: String,
}

impl PageContract {
    /// Selector of the remote-audio element for a connected peer
    pub fn audio_element_selector(&self, peer: &PeerId) -> String {
        format!("{} #audio-{}", self.audio_container_selector, peer)
    }
}

impl Default for PageContract {
    fn default() -> Self {
        Self {
            join_button_label: default_join_button(),
            call_button_label: default_call_button(),
            id_display_selector: default_id_display(),
            id_placeholder_text: default_id_placeholder(),
            peer_input_label: default_peer_input_label(),
            audio_container_selector: default_audio_container(),
        }
    }
}

fn default_join_button() -> String {
    "Join".to_string()
}

fn default_call_button() -> String {
    "Call".to_string()
}

fn default_id_display() -> String {
    "#my-id-display".to_string()
}

fn default_id_placeholder() -> String {
    "Not connected".to_string()
}

fn default_peer_input_label() -> String {
    "Peer's ID to Call:".to_string()
}

fn default_audio_container() -> String {
    "#audio-container".to_string()
}

/// Outcome of a scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed,
}

/// Wall-clock duration of one scenario phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: String,
    pub duration_ms: u64,
}

/// Machine-readable summary of one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub verdict: Verdict,
    pub target_url: String,
    /// Identifier of peer 1, once its join completed
    pub caller_id: Option<PeerId>,
    /// Identifier of peer 2, once its join completed
    pub callee_id: Option<PeerId>,
    pub phases: Vec<PhaseTiming>,
    /// Screenshot evidence written during the run
    pub artifacts: Vec<PathBuf>,
    /// Human-readable failure, absent on success
    pub error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }
}
