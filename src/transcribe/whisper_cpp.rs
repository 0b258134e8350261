// whisper.cpp command-line implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, VidsubError};
use crate::media::{ToolCommand, ToolKind};
use super::{move_output, TranscriberTrait, TranscriptFormat};

/// Runs whisper.cpp's `whisper-cli` with a local ggml model
pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, audio_path: &Path, format: TranscriptFormat, output_prefix: &Path) -> ToolCommand {
        let format_flag = match format {
            TranscriptFormat::Text => "-otxt",
            TranscriptFormat::Srt => "-osrt",
        };

        let mut cmd = ToolCommand::new(&self.config.whisper_cpp_binary, "whisper.cpp transcription")
            .kind(ToolKind::Transcription)
            .arg("-m")
            .path(&self.config.whisper_cpp_model)
            .arg("-f")
            .path(audio_path)
            .arg(format_flag)
            .arg("-of")
            .path(output_prefix);

        if let Some(lang) = &self.config.language {
            cmd = cmd.arg("-l").arg(lang);
        }
        cmd
    }
}

#[async_trait]
impl TranscriberTrait for WhisperCppTranscriber {
    fn name(&self) -> &'static str {
        "whisper-cpp"
    }

    async fn transcribe(&self, audio_path: &Path, format: TranscriptFormat, output_path: &Path) -> Result<PathBuf> {
        if !self.config.whisper_cpp_model.exists() {
            return Err(VidsubError::Transcription(format!(
                "whisper.cpp model not found at {}",
                self.config.whisper_cpp_model.display()
            )));
        }

        info!("Running whisper.cpp on {}", audio_path.display());

        let temp_dir = tempfile::tempdir()
            .map_err(|e| VidsubError::Transcription(format!("Failed to create temp directory: {}", e)))?;
        let stem = audio_path
            .file_stem()
            .ok_or_else(|| VidsubError::Transcription("Invalid audio filename".to_string()))?;
        let prefix = temp_dir.path().join(stem);

        self.build_command(audio_path, format, &prefix).execute().await?;

        // -of takes the path without extension
        let produced = temp_dir
            .path()
            .join(format!("{}.{}", stem.to_string_lossy(), format.extension()));
        move_output(&produced, output_path).await
    }

    async fn check_availability(&self) -> Result<()> {
        ToolCommand::new(&self.config.whisper_cpp_binary, "whisper.cpp availability check")
            .kind(ToolKind::Transcription)
            .arg("--help")
            .execute()
            .await?;

        if !self.config.whisper_cpp_model.exists() {
            return Err(VidsubError::Transcription(format!(
                "whisper.cpp model not found at {}",
                self.config.whisper_cpp_model.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let transcriber = WhisperCppTranscriber::new(TranscriberConfig {
            whisper_cpp_model: PathBuf::from("models/ggml-base.bin"),
            language: Some("ja".to_string()),
            ..TranscriberConfig::default()
        });
        let cmd = transcriber.build_command(Path::new("a.wav"), TranscriptFormat::Srt, Path::new("/tmp/x/a"));
        assert_eq!(
            cmd.command_line(),
            "whisper-cli -m models/ggml-base.bin -f a.wav -osrt -of /tmp/x/a -l ja"
        );
    }

    #[tokio::test]
    async fn test_missing_model_fails_before_running() {
        let transcriber = WhisperCppTranscriber::new(TranscriberConfig {
            whisper_cpp_model: PathBuf::from("/no/such/model.bin"),
            ..TranscriberConfig::default()
        });
        let err = transcriber
            .transcribe(Path::new("a.wav"), TranscriptFormat::Text, Path::new("o.txt"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }
}
