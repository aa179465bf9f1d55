//! Artifact storage for screenshot evidence and run reports
//!
//! Artifacts live at fixed paths inside the output directory so a CI job can
//! pick them up without reading the report: `verification.png` on success,
//! `failure-peer1.png` / `failure-peer2.png` on failure, plus `report.json`.
//! Fresh runs overwrite; nothing leaks across runs.

use callcheck_core::{Result, ScenarioReport};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Metadata for a stored screenshot
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// Writes run artifacts into the configured output directory
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Store a PNG screenshot as `<output_dir>/<stem>.png`
    pub async fn store_png(&self, stem: &str, data: &[u8]) -> Result<StoredArtifact> {
        fs::create_dir_all(&self.output_dir).await?;

        let path = self.output_dir.join(format!("{}.png", stem));
        fs::write(&path, data).await?;

        info!("Stored screenshot {} ({} bytes)", path.display(), data.len());

        Ok(StoredArtifact {
            path,
            size_bytes: data.len() as u64,
            created_at: Utc::now(),
        })
    }

    /// Store the run report at the given path
    ///
    /// The path may live outside the output directory (the `--report`
    /// override); parent directories are created as needed.
    pub async fn store_report(&self, report: &ScenarioReport, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(path, serde_json::to_string_pretty(report)?).await?;

        info!("Stored run report {}", path.display());
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callcheck_core::{PeerId, Verdict};

    #[tokio::test]
    async fn test_store_png_writes_nonempty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let artifact = store.store_png("verification", b"png bytes").await.unwrap();

        assert_eq!(artifact.path, dir.path().join("verification.png"));
        assert_eq!(artifact.size_bytes, 9);
        let on_disk = std::fs::read(&artifact.path).unwrap();
        assert!(!on_disk.is_empty());
    }

    #[tokio::test]
    async fn test_store_png_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store.store_png("failure-peer1", b"first run").await.unwrap();
        let second = store.store_png("failure-peer1", b"second").await.unwrap();

        assert_eq!(second.size_bytes, 6);
        assert_eq!(std::fs::read(&second.path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_store_png_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("evidence");
        let store = ArtifactStore::new(&nested);

        let artifact = store.store_png("verification", b"x").await.unwrap();
        assert!(artifact.path.starts_with(&nested));
        assert!(artifact.path.exists());
    }

    #[tokio::test]
    async fn test_store_report_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let report = ScenarioReport {
            verdict: Verdict::Failed,
            target_url: "http://localhost:8000/test-voice.html".to_string(),
            caller_id: Some(PeerId::parse("abc123").unwrap()),
            callee_id: None,
            phases: Vec::new(),
            artifacts: Vec::new(),
            error: Some("Join timed out for peer2".to_string()),
            completed_at: Utc::now(),
        };

        let path = store
            .store_report(&report, &dir.path().join("report.json"))
            .await
            .unwrap();
        let back: ScenarioReport = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert!(!back.passed());
        assert_eq!(back.error.as_deref(), Some("Join timed out for peer2"));
    }

    #[tokio::test]
    async fn test_store_report_at_external_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("evidence"));

        let report = ScenarioReport {
            verdict: Verdict::Passed,
            target_url: "http://localhost:8000/test-voice.html".to_string(),
            caller_id: Some(PeerId::parse("abc123").unwrap()),
            callee_id: Some(PeerId::parse("xyz789").unwrap()),
            phases: Vec::new(),
            artifacts: Vec::new(),
            error: None,
            completed_at: Utc::now(),
        };

        // A --report path outside the output directory still gets written,
        // with its parents created.
        let target = dir.path().join("ci").join("call-report.json");
        let path = store.store_report(&report, &target).await.unwrap();

        assert_eq!(path, target);
        assert!(target.exists());
    }
}
