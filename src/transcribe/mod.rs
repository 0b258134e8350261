// Speech-to-text through external command-line tools
//
// Backends are tried in the configured order:
// - whisper: OpenAI's whisper Python command-line tool
// - whisper_cpp: whisper.cpp's CLI with a local ggml model

pub mod whisper;
pub mod whisper_cpp;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::TranscriberConfig;
use crate::error::{Result, VidsubError};

/// Output produced by a transcription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// Plain recognized text
    Text,
    /// Timed SubRip subtitles
    Srt,
}

impl TranscriptFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Srt => "srt",
        }
    }
}

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Backend name used in logs and configuration
    fn name(&self) -> &'static str;

    /// Transcribe `audio_path` and write the result to `output_path`
    async fn transcribe(&self, audio_path: &Path, format: TranscriptFormat, output_path: &Path) -> Result<PathBuf>;

    /// Check that the backend can be executed
    async fn check_availability(&self) -> Result<()>;
}

/// Tries each backend in order until one produces a transcript
pub struct TranscriberChain {
    backends: Vec<Box<dyn TranscriberTrait>>,
}

impl TranscriberChain {
    pub fn new(backends: Vec<Box<dyn TranscriberTrait>>) -> Self {
        Self { backends }
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Availability of every backend, in order
    pub async fn check_all(&self) -> Vec<(&'static str, Result<()>)> {
        let mut results = Vec::new();
        for backend in &self.backends {
            results.push((backend.name(), backend.check_availability().await));
        }
        results
    }
}

#[async_trait]
impl TranscriberTrait for TranscriberChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn transcribe(&self, audio_path: &Path, format: TranscriptFormat, output_path: &Path) -> Result<PathBuf> {
        if !audio_path.exists() {
            return Err(VidsubError::FileNotFound(audio_path.display().to_string()));
        }

        let mut failures = Vec::new();
        for backend in &self.backends {
            info!("Transcribing {} with {}", audio_path.display(), backend.name());
            match backend.transcribe(audio_path, format, output_path).await {
                Ok(path) => return Ok(path),
                Err(e) => {
                    warn!("Transcription backend {} failed: {}", backend.name(), e);
                    failures.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        Err(VidsubError::AllBackendsFailed {
            kind: "transcription".to_string(),
            failures,
        })
    }

    async fn check_availability(&self) -> Result<()> {
        let mut failures = Vec::new();
        for (name, result) in self.check_all().await {
            match result {
                Ok(()) => return Ok(()),
                Err(e) => failures.push(format!("{}: {}", name, e)),
            }
        }
        Err(VidsubError::AllBackendsFailed {
            kind: "transcription".to_string(),
            failures,
        })
    }
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create a single backend by its configuration name
    pub fn create_transcriber(name: &str, config: &TranscriberConfig) -> Result<Box<dyn TranscriberTrait>> {
        match name {
            "whisper" => Ok(Box::new(whisper::WhisperCliTranscriber::new(config.clone()))),
            "whisper-cpp" => Ok(Box::new(whisper_cpp::WhisperCppTranscriber::new(config.clone()))),
            other => Err(VidsubError::Config(format!("Unknown transcription backend '{}'", other))),
        }
    }

    /// Create the configured fallback chain
    pub fn create_chain(config: &TranscriberConfig) -> Result<TranscriberChain> {
        let backends = config
            .backends
            .iter()
            .map(|name| Self::create_transcriber(name, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(TranscriberChain::new(backends))
    }
}

/// Move a file produced in a scratch directory to its final location
pub(crate) async fn move_output(from: &Path, to: &Path) -> Result<PathBuf> {
    if !from.exists() {
        return Err(VidsubError::Transcription(format!(
            "Expected output {} was not produced",
            from.display()
        )));
    }
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    // The scratch directory may live on another filesystem
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await?;
    Ok(to.to_path_buf())
}
