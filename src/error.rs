use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidsubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Input text is empty")]
    EmptyInput,

    #[error("Segmentation produced no cues")]
    NoSegments,

    #[error("Invalid cue timing: {0}")]
    InvalidTiming(String),

    #[error("Subtitle parsing error at line {line}: {message}")]
    SubtitleParse { line: usize, message: String },

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Translation error ({backend}): {message}")]
    Translation {
        backend: String,
        message: String,
        transient: bool,
    },

    #[error("{backend} is not configured: missing {what}")]
    MissingCredentials { backend: String, what: String },

    #[error("All {kind} backends failed: {}", .failures.join("; "))]
    AllBackendsFailed { kind: String, failures: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Step '{step}' needs: {}", .missing.join(", "))]
    MissingStep { step: String, missing: Vec<String> },
}

impl VidsubError {
    pub fn translation<B: Into<String>, M: Into<String>>(backend: B, message: M) -> Self {
        Self::Translation {
            backend: backend.into(),
            message: message.into(),
            transient: false,
        }
    }

    pub fn transient<B: Into<String>, M: Into<String>>(backend: B, message: M) -> Self {
        Self::Translation {
            backend: backend.into(),
            message: message.into(),
            transient: true,
        }
    }

    /// Whether retrying the same backend may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Translation { transient, .. } => *transient,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, VidsubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_step_message_lists_prerequisites() {
        let err = VidsubError::MissingStep {
            step: "render".to_string(),
            missing: vec!["video".to_string(), "translated text".to_string()],
        };
        assert_eq!(err.to_string(), "Step 'render' needs: video, translated text");
    }

    #[test]
    fn test_transient_classification() {
        assert!(VidsubError::transient("baidu", "HTTP 503").is_transient());
        assert!(!VidsubError::translation("baidu", "error 54001").is_transient());
        assert!(!VidsubError::EmptyInput.is_transient());
        assert!(!VidsubError::MissingCredentials {
            backend: "deepl".to_string(),
            what: "api_key".to_string(),
        }
        .is_transient());
    }
}
