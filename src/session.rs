//! Workspace directory and the session manifest that links workflow steps.
//!
//! Every step reads the manifest, checks that its prerequisites exist, writes
//! its output file into the workspace and records the path back into the
//! manifest. Missing prerequisites surface as `VidsubError::MissingStep`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, VidsubError};

pub const MANIFEST_FILE: &str = "session.json";
pub const AUDIO_FILE: &str = "extracted_audio.wav";
pub const RECOGNIZED_TEXT_FILE: &str = "audio_text.txt";
pub const EDITED_TEXT_FILE: &str = "edited_text.txt";
pub const TRANSLATED_TEXT_FILE: &str = "translated_text.txt";
pub const EXTRACTED_SUBTITLES_FILE: &str = "extracted_subs.srt";
pub const AUTO_SUBTITLES_FILE: &str = "auto_generated.srt";
pub const SUBTITLE_OUTPUT_FILE: &str = "translated_subtitles.srt";

/// Workflow steps that depend on earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ExtractAudio,
    Transcribe,
    Translate,
    Render,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::ExtractAudio, Step::Transcribe, Step::Translate, Step::Render];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ExtractAudio => "extract-audio",
            Self::Transcribe => "transcribe",
            Self::Translate => "translate",
            Self::Render => "render",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Persistent state of one video's trip through the workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub video_path: Option<PathBuf>,
    /// Subtitle files that arrived with a download
    #[serde(default)]
    pub subtitle_paths: Vec<PathBuf>,
    #[serde(default)]
    pub audio_path: Option<PathBuf>,
    #[serde(default)]
    pub recognized_text_path: Option<PathBuf>,
    #[serde(default)]
    pub edited_text_path: Option<PathBuf>,
    #[serde(default)]
    pub translated_text_path: Option<PathBuf>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub subtitle_path: Option<PathBuf>,
    #[serde(default)]
    pub output_video_path: Option<PathBuf>,
}

impl SessionState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            video_path: None,
            subtitle_paths: Vec::new(),
            audio_path: None,
            recognized_text_path: None,
            edited_text_path: None,
            translated_text_path: None,
            target_language: None,
            subtitle_path: None,
            output_video_path: None,
        }
    }

    /// Names of the prerequisites of `step` that have not been produced yet
    pub fn missing_for(&self, step: Step) -> Vec<&'static str> {
        let present = |p: &Option<PathBuf>| p.as_ref().is_some_and(|p| p.exists());

        let required: Vec<(&'static str, &Option<PathBuf>)> = match step {
            Step::ExtractAudio => vec![("video", &self.video_path)],
            Step::Transcribe => vec![("audio", &self.audio_path)],
            Step::Translate => vec![("edited text", &self.edited_text_path)],
            Step::Render => vec![
                ("video", &self.video_path),
                ("edited text", &self.edited_text_path),
                ("translated text", &self.translated_text_path),
            ],
        };

        required
            .into_iter()
            .filter(|(_, path)| !present(path))
            .map(|(name, _)| name)
            .collect()
    }

    /// Fail with `MissingStep` unless every prerequisite of `step` exists
    pub fn require(&self, step: Step) -> Result<()> {
        let missing = self.missing_for(step);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(VidsubError::MissingStep {
                step: step.name().to_string(),
                missing: missing.into_iter().map(String::from).collect(),
            })
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Directory holding intermediate files and the session manifest
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a file inside the workspace
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path(MANIFEST_FILE)
    }

    /// Load the manifest, or start a new session when there is none
    pub async fn load(&self) -> Result<SessionState> {
        let manifest = self.manifest_path();
        if !manifest.exists() {
            debug!("No session manifest at {}, starting fresh", manifest.display());
            return Ok(SessionState::new());
        }
        let content = tokio::fs::read_to_string(&manifest).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save(&self, state: &mut SessionState) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        state.updated_at = Utc::now();
        let content = serde_json::to_string_pretty(state)?;
        tokio::fs::write(self.manifest_path(), content).await?;
        debug!("Saved session {} to {}", state.id, self.manifest_path().display());
        Ok(())
    }

    /// Remove the manifest. Returns whether there was one.
    pub async fn reset(&self) -> Result<bool> {
        let manifest = self.manifest_path();
        if !manifest.exists() {
            return Ok(false);
        }
        tokio::fs::remove_file(&manifest).await?;
        info!("Cleared session manifest {}", manifest.display());
        Ok(true)
    }
}
