// Media processing through ffmpeg and ffprobe
//
// - processor: the ffmpeg-backed implementation
// - commands: command line building and execution
// - style: subtitle filter styling and path quoting

pub mod commands;
pub mod processor;
pub mod style;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use commands::*;
pub use processor::*;
pub use style::SubtitleStyle;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Render subtitles into the video frames
    async fn burn_subtitles(&self, video_path: &Path, subtitle_path: &Path, output_path: &Path) -> Result<()>;

    /// Add subtitle files as separate soft subtitle streams; each track is (file, language)
    async fn mux_subtitles(&self, video_path: &Path, tracks: &[(PathBuf, String)], output_path: &Path) -> Result<()>;

    /// Extract 16 kHz mono PCM audio from video
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Indices of the subtitle streams in a container
    async fn probe_subtitle_streams(&self, video_path: &Path) -> Result<Vec<u32>>;

    /// Write the `stream`-th subtitle stream to an SRT file
    async fn extract_subtitle_track(&self, video_path: &Path, stream: usize, output_path: &Path) -> Result<()>;

    /// Check if media processor is available
    async fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;

    /// Version line of the stream probe (ffprobe)
    async fn get_probe_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
