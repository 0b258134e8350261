use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, VidsubError};
use super::commands::parse_stream_indices;
use super::{MediaCommandBuilder, MediaProcessorTrait};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, &config.probe_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn burn_subtitles(&self, video_path: &Path, subtitle_path: &Path, output_path: &Path) -> Result<()> {
        info!(
            "Embedding subtitles from {} into {} -> {}",
            subtitle_path.display(),
            video_path.display(),
            output_path.display()
        );

        for path in [video_path, subtitle_path] {
            if !path.exists() {
                return Err(VidsubError::FileNotFound(path.display().to_string()));
            }
        }
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let command = self.command_builder.burn_subtitles(
            video_path,
            subtitle_path,
            output_path,
            &self.config.preset,
            &self.config.style,
            &self.config.subtitle_options,
        )?;
        info!("Full command: {}", command.command_line());

        command.execute().await?;

        info!("Subtitle embedding completed successfully");
        Ok(())
    }

    async fn mux_subtitles(&self, video_path: &Path, tracks: &[(PathBuf, String)], output_path: &Path) -> Result<()> {
        info!(
            "Muxing {} subtitle tracks into {} -> {}",
            tracks.len(),
            video_path.display(),
            output_path.display()
        );

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        self.command_builder
            .mux_subtitles(video_path, tracks, output_path)
            .execute()
            .await?;

        info!("Subtitle muxing completed");
        Ok(())
    }

    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        if !video_path.exists() {
            return Err(VidsubError::FileNotFound(video_path.display().to_string()));
        }

        let command = self.command_builder.extract_audio(video_path, audio_path);
        command.execute().await?;

        info!("Audio extraction completed");
        Ok(())
    }

    async fn probe_subtitle_streams(&self, video_path: &Path) -> Result<Vec<u32>> {
        debug!("Probing subtitle streams of {}", video_path.display());

        let output = self.command_builder.probe_subtitle_streams(video_path).execute().await?;
        let streams = parse_stream_indices(&output);

        debug!("Found {} subtitle streams", streams.len());
        Ok(streams)
    }

    async fn extract_subtitle_track(&self, video_path: &Path, stream: usize, output_path: &Path) -> Result<()> {
        info!("Extracting subtitle stream {} from {}", stream, video_path.display());

        self.command_builder
            .extract_subtitle_track(video_path, stream, output_path)
            .execute()
            .await?;

        if !output_path.exists() {
            return Err(VidsubError::Media(format!(
                "Subtitle extraction produced no file at {}",
                output_path.display()
            )));
        }
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        let output = self.command_builder.version_check().execute().await?;

        if output.contains("ffmpeg version") {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(VidsubError::Media("Media processor version check failed".to_string()))
        }
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let output = self.command_builder.version_check().execute().await?;
        // The first line carries the version
        let first_line = output.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }

    async fn get_probe_version_info(&self) -> Result<String> {
        let output = self.command_builder.probe_version_check().execute().await?;
        Ok(output.lines().next().unwrap_or("Unknown version").to_string())
    }
}
