use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::DownloadConfig;
use crate::error::{Result, VidsubError};
use crate::media::{ToolCommand, ToolKind};

/// A downloaded video and the subtitle files fetched alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub video_path: PathBuf,
    pub subtitle_paths: Vec<PathBuf>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch `url` into `output_dir`
    async fn download(&self, url: &str, output_dir: &Path) -> Result<Download>;

    /// Check that the downloader can be executed
    async fn check_availability(&self) -> Result<String>;
}

/// yt-dlp based downloader
pub struct YtDlpDownloader {
    config: DownloadConfig,
}

impl YtDlpDownloader {
    pub fn new(config: DownloadConfig) -> Self {
        Self { config }
    }

    fn download_command(&self, url: &str, video_path: &Path) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, "Video download")
            .kind(ToolKind::Download)
            .arg(url)
            .arg("-o")
            .path(video_path)
            .arg("--no-playlist")
            .arg("--write-auto-sub")
            .arg("--sub-format")
            .arg("srt")
            .arg("--sub-lang")
            .arg(&self.config.sub_lang)
            .arg("--convert-subs")
            .arg("srt")
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(&self, url: &str, output_dir: &Path) -> Result<Download> {
        let url = url.trim();
        if !is_url(url) {
            return Err(VidsubError::Download(format!("Not a http(s) URL: '{}'", url)));
        }

        tokio::fs::create_dir_all(output_dir).await?;
        let video_path = output_dir.join(&self.config.file_name);

        info!("Downloading {} to {}", url, video_path.display());
        self.download_command(url, &video_path).execute().await?;

        if !video_path.exists() {
            return Err(VidsubError::Download(format!(
                "Downloader finished but {} does not exist",
                video_path.display()
            )));
        }

        let subtitle_paths = find_sidecar_subtitles(&video_path);
        info!("Download completed with {} subtitle files", subtitle_paths.len());

        Ok(Download {
            video_path,
            subtitle_paths,
        })
    }

    async fn check_availability(&self) -> Result<String> {
        let output = ToolCommand::new(&self.config.binary_path, "Downloader version check")
            .kind(ToolKind::Download)
            .arg("--version")
            .execute()
            .await?;
        Ok(output.trim().to_string())
    }
}

/// True for inputs that should be downloaded rather than read from disk
pub fn is_url(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// SRT files next to `video_path` whose name starts with the video's stem
pub fn find_sidecar_subtitles(video_path: &Path) -> Vec<PathBuf> {
    let (Some(dir), Some(stem)) = (video_path.parent(), video_path.file_stem()) else {
        return Vec::new();
    };
    let stem = stem.to_string_lossy();
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };

    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            let is_srt = p
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("srt"));
            let name = p.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            is_srt && name.starts_with(stem.as_ref())
        })
        .collect();

    found.sort();
    debug!("Sidecar subtitles for {}: {:?}", video_path.display(), found);
    found
}
