//! Two-party call scenario orchestration
//!
//! The runner reproduces one fixed sequence, one suspending operation at a
//! time: navigate both peers, click Join on peer 1 then peer 2, read the
//! assigned identifiers in the same order, have peer 1 call peer 2's
//! identifier, then wait for the remote audio element on peer 1's page. The
//! two sessions run their own page logic in the background between steps;
//! the runner never drives them concurrently.
//!
//! There is no retry anywhere. Each bounded wait either succeeds within its
//! timeout or the whole run fails.

use crate::artifacts::{ArtifactStore, StoredArtifact};
use crate::session::CallSession;
use callcheck_browser::BrowserHarness;
use callcheck_core::{
    CallcheckError, PageContract, PeerId, PeerSlot, PhaseTiming, Result, ScenarioConfig,
    ScenarioReport, Verdict,
};
use chrono::Utc;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Collects wall-clock durations per scenario phase
#[derive(Debug, Default)]
struct PhaseRecorder {
    phases: Vec<PhaseTiming>,
}

impl PhaseRecorder {
    fn record(&mut self, phase: &str, started: Instant) {
        self.phases.push(PhaseTiming {
            phase: phase.to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
        });
    }

    fn into_phases(self) -> Vec<PhaseTiming> {
        self.phases
    }
}

/// Identifiers assigned during the join phase, filled in as they arrive so a
/// failure report can show how far the run got
#[derive(Debug, Default)]
struct PeerIds {
    caller: Option<PeerId>,
    callee: Option<PeerId>,
}

/// Drives the two-party call scenario to a verdict
pub struct ScenarioRunner {
    config: ScenarioConfig,
    contract: PageContract,
}

impl ScenarioRunner {
    pub fn new(config: ScenarioConfig) -> Self {
        Self::with_contract(config, PageContract::default())
    }

    /// Run against a page with a non-default selector contract
    pub fn with_contract(config: ScenarioConfig, contract: PageContract) -> Self {
        Self { config, contract }
    }

    /// Execute the scenario
    ///
    /// Returns the run report on success. On failure, diagnostic screenshots
    /// of both pages and a failure report are written best-effort, then the
    /// original error propagates. The browser process is released on every
    /// path.
    pub async fn run(&self) -> Result<ScenarioReport> {
        self.config.validate()?;

        let store = ArtifactStore::new(self.config.output_dir.clone());
        let harness = BrowserHarness::launch(self.config.browser.clone()).await?;

        let poll = self.config.timeouts.poll_interval();
        let caller = harness.new_peer_session(PeerSlot::Caller, poll).await?;
        let callee = harness.new_peer_session(PeerSlot::Callee, poll).await?;

        self.execute(&caller, &callee, &store).await
        // harness drops here, killing the browser, on both paths
    }

    /// Drive the phases against a pair of sessions and settle the verdict
    async fn execute<S: CallSession>(
        &self,
        caller: &S,
        callee: &S,
        store: &ArtifactStore,
    ) -> Result<ScenarioReport> {
        let mut recorder = PhaseRecorder::default();
        let mut ids = PeerIds::default();

        match self.drive(caller, callee, store, &mut recorder, &mut ids).await {
            Ok(evidence) => {
                let report = self.build_report(
                    Verdict::Passed,
                    ids,
                    recorder.into_phases(),
                    vec![evidence.path.clone()],
                    None,
                );
                store.store_report(&report, &self.config.report_path()).await?;
                info!("Scenario passed: audio element visible on {}'s page", PeerSlot::Caller);
                Ok(report)
            }
            Err(err) => {
                warn!("Scenario failed: {}", err);

                // Best-effort evidence; a screenshot failure must not mask
                // the error that sank the run.
                let artifacts = self.capture_diagnostics(store, caller, callee).await;

                let report = self.build_report(
                    Verdict::Failed,
                    ids,
                    recorder.into_phases(),
                    artifacts,
                    Some(err.to_string()),
                );
                if let Err(report_err) =
                    store.store_report(&report, &self.config.report_path()).await
                {
                    warn!("Failed to write failure report: {}", report_err);
                }

                Err(err)
            }
        }
    }

    /// The ordered phases; any error aborts the remainder of the sequence
    async fn drive<S: CallSession>(
        &self,
        caller: &S,
        callee: &S,
        store: &ArtifactStore,
        recorder: &mut PhaseRecorder,
        ids: &mut PeerIds,
    ) -> Result<StoredArtifact> {
        // Navigate both peers, then hook their consoles
        let started = Instant::now();
        for session in [caller, callee] {
            session
                .navigate(&self.config.target_url, self.config.timeouts.navigation())
                .await?;
            session.install_console_hook()?;
        }
        recorder.record("navigate", started);

        // Join clicks go out for both peers, caller first, before either
        // identifier wait: the peers register with the signaling layer in
        // quick succession, in a fixed order. The page assigns identifiers
        // during join and concurrent joins can race, so this ordering is a
        // contract of the harness, not an optimization.
        let started = Instant::now();
        self.click_join(caller).await?;
        self.click_join(callee).await?;

        let caller_id = self.read_assigned_id(caller).await?;
        ids.caller = Some(caller_id.clone());

        let callee_id = self.read_assigned_id(callee).await?;
        ids.callee = Some(callee_id.clone());

        if caller_id == callee_id {
            return Err(CallcheckError::PageContract(format!(
                "both peers were assigned the same identifier '{}'",
                caller_id
            )));
        }
        recorder.record("join", started);

        // Caller dials the callee's identifier
        let started = Instant::now();
        info!("{} ({}) is calling {} ({})", PeerSlot::Caller, caller_id, PeerSlot::Callee, callee_id);
        caller
            .fill_labeled_input(&self.contract.peer_input_label, callee_id.as_str())
            .await?;
        caller.click_button(&self.contract.call_button_label).await?;
        recorder.record("call", started);

        // The verdict: the callee's audio element visible on the caller's page
        let started = Instant::now();
        let selector = self.contract.audio_element_selector(&callee_id);
        info!("Waiting for '{}' on {}'s page", selector, PeerSlot::Caller);

        let visible = caller
            .wait_for_visible(&selector, self.config.timeouts.verify())
            .await?;
        if !visible {
            return Err(CallcheckError::VerificationTimeout { selector });
        }
        recorder.record("verify", started);

        caller.relay_console();
        callee.relay_console();

        let png = caller.capture_screenshot()?;
        store.store_png("verification", &png).await
    }

    /// Register a peer with the signaling layer
    async fn click_join<S: CallSession>(&self, session: &S) -> Result<()> {
        session.click_button(&self.contract.join_button_label).await
    }

    /// Wait for the page to assign an identifier to a joined peer
    async fn read_assigned_id<S: CallSession>(&self, session: &S) -> Result<PeerId> {
        let text = session
            .wait_for_text_past_placeholder(
                &self.contract.id_display_selector,
                &self.contract.id_placeholder_text,
                self.config.timeouts.join(),
            )
            .await?
            .ok_or_else(|| CallcheckError::JoinTimeout {
                peer: session.slot().label().to_string(),
            })?;

        let id = PeerId::parse(&text)?;
        info!("{} joined with id {}", session.slot(), id);
        Ok(id)
    }

    /// Capture failure screenshots of both pages; never fails
    async fn capture_diagnostics<S: CallSession>(
        &self,
        store: &ArtifactStore,
        caller: &S,
        callee: &S,
    ) -> Vec<PathBuf> {
        let mut artifacts = Vec::new();

        for session in [caller, callee] {
            session.relay_console();

            let stem = format!("failure-{}", session.slot());
            let stored = match session.capture_screenshot() {
                Ok(png) => store.store_png(&stem, &png).await,
                Err(e) => Err(e),
            };

            match stored {
                Ok(artifact) => artifacts.push(artifact.path),
                Err(e) => warn!("Diagnostic screenshot for {} failed: {}", session.slot(), e),
            }
        }

        artifacts
    }

    fn build_report(
        &self,
        verdict: Verdict,
        ids: PeerIds,
        phases: Vec<PhaseTiming>,
        artifacts: Vec<PathBuf>,
        error: Option<String>,
    ) -> ScenarioReport {
        ScenarioReport {
            verdict,
            target_url: self.config.target_url.clone(),
            caller_id: ids.caller,
            callee_id: ids.callee,
            phases,
            artifacts,
            error,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new(ScenarioConfig::default())
    }

    /// Scripted stand-in for a browser session: records every action it is
    /// asked to perform, in order, into a log shared by both peers
    struct ScriptedSession {
        slot: PeerSlot,
        /// Identifier the page "assigns" on join; None means it never does
        assigned_id: Option<String>,
        audio_visible: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedSession {
        fn pair(
            caller_id: Option<&str>,
            callee_id: Option<&str>,
            audio_visible: bool,
        ) -> (Self, Self, Arc<Mutex<Vec<String>>>) {
            let log = Arc::new(Mutex::new(Vec::new()));
            let caller = Self {
                slot: PeerSlot::Caller,
                assigned_id: caller_id.map(String::from),
                audio_visible,
                log: log.clone(),
            };
            let callee = Self {
                slot: PeerSlot::Callee,
                assigned_id: callee_id.map(String::from),
                audio_visible,
                log: log.clone(),
            };
            (caller, callee, log)
        }

        fn push(&self, entry: String) {
            self.log.lock().unwrap().push(entry);
        }
    }

    #[async_trait]
    impl CallSession for ScriptedSession {
        fn slot(&self) -> PeerSlot {
            self.slot
        }

        async fn navigate(&self, _url: &str, _timeout: Duration) -> Result<()> {
            self.push(format!("{} navigate", self.slot));
            Ok(())
        }

        fn install_console_hook(&self) -> Result<()> {
            Ok(())
        }

        fn relay_console(&self) {}

        async fn click_button(&self, label: &str) -> Result<()> {
            self.push(format!("{} click {}", self.slot, label));
            Ok(())
        }

        async fn fill_labeled_input(&self, label: &str, value: &str) -> Result<()> {
            self.push(format!("{} fill {} = {}", self.slot, label, value));
            Ok(())
        }

        async fn wait_for_text_past_placeholder(
            &self,
            _selector: &str,
            _placeholder: &str,
            _timeout: Duration,
        ) -> Result<Option<String>> {
            self.push(format!("{} wait-id", self.slot));
            Ok(self.assigned_id.clone())
        }

        async fn wait_for_visible(&self, selector: &str, _timeout: Duration) -> Result<bool> {
            self.push(format!("{} wait-visible {}", self.slot, selector));
            Ok(self.audio_visible)
        }

        fn capture_screenshot(&self) -> Result<Vec<u8>> {
            self.push(format!("{} screenshot", self.slot));
            Ok(b"png".to_vec())
        }
    }

    fn runner_into(dir: &tempfile::TempDir) -> ScenarioRunner {
        let mut config = ScenarioConfig::default();
        config.output_dir = dir.path().to_path_buf();
        ScenarioRunner::new(config)
    }

    #[tokio::test]
    async fn test_join_clicks_precede_identifier_waits() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner_into(&dir);
        let store = ArtifactStore::new(dir.path());
        let (caller, callee, log) = ScriptedSession::pair(Some("abc123"), Some("xyz789"), true);

        let report = runner.execute(&caller, &callee, &store).await.unwrap();
        assert!(report.passed());

        // Both Join clicks must go out before either identifier wait, and
        // peer 1 strictly before peer 2 at each step.
        let log = log.lock().unwrap();
        let pos = |entry: &str| {
            log.iter()
                .position(|l| l == entry)
                .unwrap_or_else(|| panic!("missing '{}' in {:?}", entry, *log))
        };
        assert!(pos("peer1 click Join") < pos("peer2 click Join"));
        assert!(pos("peer2 click Join") < pos("peer1 wait-id"));
        assert!(pos("peer1 wait-id") < pos("peer2 wait-id"));
        assert!(pos("peer2 wait-id") < pos("peer1 click Call"));
    }

    #[tokio::test]
    async fn test_successful_run_writes_evidence_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner_into(&dir);
        let store = ArtifactStore::new(dir.path());
        let (caller, callee, log) = ScriptedSession::pair(Some("abc123"), Some("xyz789"), true);

        let report = runner.execute(&caller, &callee, &store).await.unwrap();

        assert_eq!(report.caller_id, Some(PeerId::parse("abc123").unwrap()));
        assert_eq!(report.callee_id, Some(PeerId::parse("xyz789").unwrap()));
        assert!(dir.path().join("verification.png").exists());
        assert!(dir.path().join("report.json").exists());

        // The caller dialed the callee's identifier and verified its audio
        // element.
        let log = log.lock().unwrap();
        assert!(log.iter().any(|l| l == "peer1 fill Peer's ID to Call: = xyz789"));
        assert!(log
            .iter()
            .any(|l| l == "peer1 wait-visible #audio-container #audio-xyz789"));
    }

    #[tokio::test]
    async fn test_join_timeout_short_circuits_call_phase() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner_into(&dir);
        let store = ArtifactStore::new(dir.path());
        // Peer 2 never gets an identifier.
        let (caller, callee, log) = ScriptedSession::pair(Some("abc123"), None, true);

        let err = runner.execute(&caller, &callee, &store).await.unwrap_err();
        assert!(matches!(err, CallcheckError::JoinTimeout { ref peer } if peer == "peer2"));

        let log = log.lock().unwrap();
        // No input was filled and no call was placed.
        assert!(!log.iter().any(|l| l.contains("fill")));
        assert!(!log.iter().any(|l| l.contains("click Call")));
        // Diagnostics still ran for both peers.
        assert!(log.iter().any(|l| l == "peer1 screenshot"));
        assert!(log.iter().any(|l| l == "peer2 screenshot"));

        // The failure report shows exactly how far the run got.
        let report: ScenarioReport = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("report.json")).unwrap(),
        )
        .unwrap();
        assert!(!report.passed());
        assert!(report.caller_id.is_some());
        assert!(report.callee_id.is_none());
    }

    #[tokio::test]
    async fn test_verification_timeout_produces_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner_into(&dir);
        let store = ArtifactStore::new(dir.path());
        let (caller, callee, _log) = ScriptedSession::pair(Some("abc123"), Some("xyz789"), false);

        let err = runner.execute(&caller, &callee, &store).await.unwrap_err();
        assert!(matches!(err, CallcheckError::VerificationTimeout { .. }));

        assert!(dir.path().join("failure-peer1.png").exists());
        assert!(dir.path().join("failure-peer2.png").exists());
        assert!(!dir.path().join("verification.png").exists());
    }

    #[test]
    fn test_phase_recorder_orders_phases() {
        let mut recorder = PhaseRecorder::default();
        let t = Instant::now();
        recorder.record("navigate", t);
        recorder.record("join", t);

        let phases = recorder.into_phases();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].phase, "navigate");
        assert_eq!(phases[1].phase, "join");
    }

    #[test]
    fn test_phase_recorder_measures_elapsed() {
        let mut recorder = PhaseRecorder::default();
        let started = Instant::now() - Duration::from_millis(50);
        recorder.record("verify", started);
        assert!(recorder.into_phases()[0].duration_ms >= 50);
    }

    #[test]
    fn test_success_report_carries_both_ids() {
        let ids = PeerIds {
            caller: Some(PeerId::parse("abc123").unwrap()),
            callee: Some(PeerId::parse("xyz789").unwrap()),
        };

        let report = runner().build_report(
            Verdict::Passed,
            ids,
            Vec::new(),
            vec![PathBuf::from("verification/verification.png")],
            None,
        );

        assert!(report.passed());
        assert_ne!(report.caller_id, report.callee_id);
        assert!(report.error.is_none());
        assert_eq!(report.artifacts.len(), 1);
    }

    #[test]
    fn test_failure_report_shows_partial_progress() {
        // Caller joined, callee never did: the report should show exactly
        // that, with the error preserved.
        let ids = PeerIds {
            caller: Some(PeerId::parse("abc123").unwrap()),
            callee: None,
        };

        let err = CallcheckError::JoinTimeout {
            peer: "peer2".to_string(),
        };
        let report = runner().build_report(
            Verdict::Failed,
            ids,
            Vec::new(),
            Vec::new(),
            Some(err.to_string()),
        );

        assert!(!report.passed());
        assert!(report.caller_id.is_some());
        assert!(report.callee_id.is_none());
        assert!(report.error.unwrap().contains("peer2"));
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let mut config = ScenarioConfig::default();
        config.timeouts.verify_secs = 0;
        let runner = ScenarioRunner::new(config);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let err = rt.block_on(runner.run()).unwrap_err();
        assert!(matches!(err, CallcheckError::Config(_)));
    }
}
