//! Configuration for the scenario runner
//!
//! Loaded from an optional `callcheck.toml`; every field has a default that
//! reproduces the original verification scenario, so a bare `callcheck run`
//! works against a locally served test page.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{CallcheckError, Result};

/// Full configuration of one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Page under test; the serving process is an external collaborator
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Bounded-wait budgets, one per phase
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Directory receiving screenshot evidence and the run report
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Explicit path for the run report; `<output_dir>/report.json` if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

/// Per-phase wait budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Page load budget per peer
    #[serde(default = "default_navigation_secs")]
    pub navigation_secs: u64,

    /// Budget for the identifier display to leave its placeholder
    #[serde(default = "default_join_secs")]
    pub join_secs: u64,

    /// Budget for the remote-audio element to become visible
    #[serde(default = "default_verify_secs")]
    pub verify_secs: u64,

    /// Interval between condition polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl TimeoutConfig {
    pub fn navigation(&self) -> Duration {
        Duration::from_secs(self.navigation_secs)
    }

    pub fn join(&self) -> Duration {
        Duration::from_secs(self.join_secs)
    }

    pub fn verify(&self) -> Duration {
        Duration::from_secs(self.verify_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Browser launch settings
///
/// The fake-media pair is what lets WebRTC negotiation succeed on a machine
/// with no microphone; the page never sees a permission prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Enable `--use-fake-ui-for-media-stream` and
    /// `--use-fake-device-for-media-stream`
    #[serde(default = "default_true")]
    pub fake_media: bool,

    /// Chromium sandbox; disabled by default to match CI containers
    #[serde(default)]
    pub sandbox: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            fake_media: true,
            sandbox: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

// Default value providers
fn default_target_url() -> String {
    "http://localhost:8000/test-voice.html".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("verification")
}

fn default_navigation_secs() -> u64 {
    10
}

fn default_join_secs() -> u64 {
    15
}

fn default_verify_secs() -> u64 {
    20
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

impl ScenarioConfig {
    /// Load configuration from a TOML file, or use defaults if it is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content).map_err(|e| {
                CallcheckError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            config.validate()?;
            debug!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            debug!("{} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write the default configuration to a TOML file
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| CallcheckError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject configurations the runner cannot execute
    pub fn validate(&self) -> Result<()> {
        if self.target_url.trim().is_empty() {
            return Err(CallcheckError::Config("target_url is empty".to_string()));
        }

        if self.timeouts.navigation_secs == 0
            || self.timeouts.join_secs == 0
            || self.timeouts.verify_secs == 0
        {
            return Err(CallcheckError::Config(
                "all phase timeouts must be greater than zero".to_string(),
            ));
        }

        if self.timeouts.poll_interval_ms == 0 {
            return Err(CallcheckError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the success screenshot
    pub fn success_screenshot_path(&self) -> PathBuf {
        self.output_dir.join("verification.png")
    }

    /// Path of a peer's diagnostic screenshot
    pub fn failure_screenshot_path(&self, peer_label: &str) -> PathBuf {
        self.output_dir.join(format!("failure-{}.png", peer_label))
    }

    /// Path of the machine-readable run report
    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join("report.json"))
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            timeouts: TimeoutConfig::default(),
            browser: BrowserSettings::default(),
            output_dir: default_output_dir(),
            report_path: None,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            navigation_secs: default_navigation_secs(),
            join_secs: default_join_secs(),
            verify_secs: default_verify_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
