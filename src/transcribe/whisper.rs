// OpenAI Whisper command-line implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::TranscriberConfig;
use crate::error::{Result, VidsubError};
use crate::media::{ToolCommand, ToolKind};
use super::{move_output, TranscriberTrait, TranscriptFormat};

/// Runs the `whisper` Python CLI
pub struct WhisperCliTranscriber {
    config: TranscriberConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    /// Text uses the more accurate model, subtitles the faster one
    fn model_for(&self, format: TranscriptFormat) -> &str {
        match format {
            TranscriptFormat::Text => &self.config.text_model,
            TranscriptFormat::Srt => &self.config.subtitle_model,
        }
    }

    fn build_command(&self, audio_path: &Path, format: TranscriptFormat, output_dir: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.config.whisper_binary, "Whisper transcription")
            .kind(ToolKind::Transcription)
            .path(audio_path)
            .arg("--model")
            .arg(self.model_for(format))
            .arg("--output_dir")
            .path(output_dir)
            .arg("--output_format")
            .arg(format.extension());

        if let Some(lang) = &self.config.language {
            cmd = cmd.arg("--language").arg(lang);
        }
        cmd
    }
}

#[async_trait]
impl TranscriberTrait for WhisperCliTranscriber {
    fn name(&self) -> &'static str {
        "whisper"
    }

    async fn transcribe(&self, audio_path: &Path, format: TranscriptFormat, output_path: &Path) -> Result<PathBuf> {
        info!(
            "Running whisper ({}) on {}",
            self.model_for(format),
            audio_path.display()
        );

        let temp_dir = tempfile::tempdir()
            .map_err(|e| VidsubError::Transcription(format!("Failed to create temp directory: {}", e)))?;

        self.build_command(audio_path, format, temp_dir.path()).execute().await?;

        // whisper names its output after the input file
        let stem = audio_path
            .file_stem()
            .ok_or_else(|| VidsubError::Transcription("Invalid audio filename".to_string()))?;
        let produced = temp_dir
            .path()
            .join(format!("{}.{}", stem.to_string_lossy(), format.extension()));
        debug!("Whisper output: {}", produced.display());

        move_output(&produced, output_path).await
    }

    async fn check_availability(&self) -> Result<()> {
        ToolCommand::new(&self.config.whisper_binary, "Whisper availability check")
            .kind(ToolKind::Transcription)
            .arg("--help")
            .execute()
            .await
            .map(|_| ())
            .map_err(|e| {
                VidsubError::Transcription(format!(
                    "whisper is not available (install with: pip install openai-whisper): {}",
                    e
                ))
            })
    }
}
