//! # callcheck-scenario
//!
//! Orchestration of the two-party voice-call verification scenario.
//!
//! The runner owns the whole lifecycle: launch one browser with fake media
//! devices, create two isolated peer sessions, navigate them to the page
//! under test, join sequentially, place the call, and wait for the remote
//! audio element as evidence that the call connected. Screenshot evidence
//! and a JSON report land in the configured output directory on both the
//! success and failure paths.
//!
//! ```no_run
//! use callcheck_core::ScenarioConfig;
//! use callcheck_scenario::ScenarioRunner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = ScenarioRunner::new(ScenarioConfig::default());
//!     let report = runner.run().await?;
//!     assert!(report.passed());
//!     Ok(())
//! }
//! ```

pub mod artifacts;
pub mod runner;
pub mod session;

pub use artifacts::{ArtifactStore, StoredArtifact};
pub use runner::ScenarioRunner;
pub use session::CallSession;
