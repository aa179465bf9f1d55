//! Unified error types for callcheck

use thiserror::Error;

/// Unified error type for all callcheck operations
#[derive(Error, Debug)]
pub enum CallcheckError {
    // Bounded-wait failures (one per scenario phase)
    #[error("Navigation timed out for {peer} loading {url}")]
    NavigationTimeout { peer: String, url: String },

    #[error("Join timed out for {peer}: identifier display never left its placeholder")]
    JoinTimeout { peer: String },

    #[error("Verification timed out: '{selector}' never became visible")]
    VerificationTimeout { selector: String },

    // Browser errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Screenshot error: {0}")]
    Screenshot(String),

    // Page contract violations
    #[error("Page contract violation: {0}")]
    PageContract(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl CallcheckError {
    /// True for the three bounded-wait failures; every other variant is an
    /// unexpected failure as far as the scenario verdict is concerned.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::NavigationTimeout { .. } | Self::JoinTimeout { .. } | Self::VerificationTimeout { .. }
        )
    }
}

/// Result type alias using CallcheckError
pub type Result<T> = std::result::Result<T, CallcheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let nav = CallcheckError::NavigationTimeout {
            peer: "peer1".to_string(),
            url: "http://localhost:8000/test-voice.html".to_string(),
        };
        let join = CallcheckError::JoinTimeout {
            peer: "peer2".to_string(),
        };
        let verify = CallcheckError::VerificationTimeout {
            selector: "#audio-container #audio-xyz789".to_string(),
        };

        assert!(nav.is_timeout());
        assert!(join.is_timeout());
        assert!(verify.is_timeout());

        assert!(!CallcheckError::Browser("launch failed".to_string()).is_timeout());
        assert!(!CallcheckError::Other("boom".to_string()).is_timeout());
    }

    #[test]
    fn test_display_names_the_subject() {
        let err = CallcheckError::JoinTimeout {
            peer: "peer1".to_string(),
        };
        assert!(err.to_string().contains("peer1"));

        let err = CallcheckError::VerificationTimeout {
            selector: "#audio-container #audio-abc".to_string(),
        };
        assert!(err.to_string().contains("#audio-abc"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CallcheckError = io.into();
        assert!(matches!(err, CallcheckError::Io(_)));
    }
}
