use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, VidsubError};
use crate::media::style::{parse_colour, SubtitleStyle};

/// Names accepted in `translate.backends`
pub const TRANSLATION_BACKENDS: &[&str] = &["baidu", "deepl", "openai", "libre", "ollama", "placeholder"];

/// Names accepted in `transcriber.backends`
pub const TRANSCRIPTION_BACKENDS: &[&str] = &["whisper", "whisper-cpp"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub download: DownloadConfig,
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub subtitle: SubtitleConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding intermediate files and the session manifest
    pub dir: PathBuf,
    /// Directory receiving rendered videos and subtitle files
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Path to yt-dlp binary
    pub binary_path: String,
    /// Language of automatic subtitles requested from the site
    pub sub_lang: String,
    /// File name of the downloaded video inside the workspace
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Backends tried in order: "whisper", "whisper-cpp"
    pub backends: Vec<String>,
    /// Path to the OpenAI whisper command-line tool
    pub whisper_binary: String,
    /// Model used when producing plain text
    pub text_model: String,
    /// Model used when generating subtitles for videos without any
    pub subtitle_model: String,
    /// Path to whisper.cpp binary
    pub whisper_cpp_binary: String,
    /// Path to the ggml model file used by whisper.cpp
    pub whisper_cpp_model: PathBuf,
    /// Spoken language hint, auto-detected when absent
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Backends tried in order until one succeeds
    pub backends: Vec<String>,
    /// Maximum retries of a backend after a transient failure
    pub max_retries: u32,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum characters sent per request when translating free text
    pub paragraph_limit: usize,
    pub baidu: BaiduConfig,
    pub deepl: DeeplConfig,
    pub openai: OpenAiConfig,
    pub libre: LibreConfig,
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaiduConfig {
    pub endpoint: String,
    pub app_id: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeeplConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Source language sent to DeepL
    pub source_lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibreConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama endpoint URL
    pub endpoint: String,
    /// LLM model to use for translation
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    /// Maximum characters per cue before a forced split
    pub max_segment_len: usize,
    /// Display time per character in seconds
    pub seconds_per_char: f64,
    /// Shortest allowed cue duration in seconds
    pub min_duration: f64,
    /// Extra time after sentence-terminal punctuation
    pub terminal_pause: f64,
    /// Extra time after comma-class punctuation
    pub comma_pause: f64,
    /// Extra time after any other final character
    pub default_pause: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_path: String,
    /// x264 preset used when burning subtitles
    pub preset: String,
    /// Additional encoding options for subtitle embedding
    /// Common options: ["-crf", "23", "-pix_fmt", "yuv420p"]
    pub subtitle_options: Vec<String>,
    /// Appearance of burned-in subtitles
    pub style: SubtitleStyle,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".vidsub/workspace"),
            output_dir: PathBuf::from(".vidsub/output"),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            binary_path: "yt-dlp".to_string(),
            sub_lang: "zh-CN".to_string(),
            file_name: "downloaded_video.mp4".to_string(),
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            backends: vec!["whisper".to_string(), "whisper-cpp".to_string()],
            whisper_binary: "whisper".to_string(),
            text_model: "base".to_string(),
            subtitle_model: "tiny".to_string(),
            whisper_cpp_binary: "whisper-cli".to_string(),
            whisper_cpp_model: PathBuf::from(".vidsub/models/ggml-base.bin"),
            language: None,
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            backends: vec!["baidu".to_string(), "placeholder".to_string()],
            max_retries: 2,
            timeout_secs: 60,
            paragraph_limit: 500,
            baidu: BaiduConfig::default(),
            deepl: DeeplConfig::default(),
            openai: OpenAiConfig::default(),
            libre: LibreConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl Default for BaiduConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://api.fanyi.baidu.com/api/trans/vip/translate".to_string(),
            app_id: None,
            secret_key: None,
        }
    }
}

impl Default for DeeplConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-free.deepl.com/v2/translate".to_string(),
            api_key: None,
            source_lang: "ZH".to_string(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
        }
    }
}

impl Default for LibreConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://libretranslate.de".to_string(),
            api_key: None,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            max_segment_len: 50,
            seconds_per_char: 0.2,
            min_duration: 1.0,
            terminal_pause: 0.6,
            comma_pause: 0.3,
            default_pause: 0.1,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_path: "ffprobe".to_string(),
            preset: "fast".to_string(),
            subtitle_options: Vec::new(),
            style: SubtitleStyle::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VidsubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| VidsubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VidsubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| VidsubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Fill credentials from environment variables, which take precedence over the file
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("BAIDU_APPID") {
            self.translate.baidu.app_id = Some(v);
        }
        if let Some(v) = non_empty("BAIDU_SECRET_KEY") {
            self.translate.baidu.secret_key = Some(v);
        }
        if let Some(v) = non_empty("DEEPL_API_KEY") {
            self.translate.deepl.api_key = Some(v);
        }
        if let Some(v) = non_empty("OPENAI_API_KEY") {
            self.translate.openai.api_key = Some(v);
        }
        if let Some(v) = non_empty("LIBRETRANSLATE_API_KEY") {
            self.translate.libre.api_key = Some(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let sub = &self.subtitle;
        if !(sub.seconds_per_char > 0.0) {
            return Err(VidsubError::Config("subtitle.seconds_per_char must be positive".to_string()));
        }
        if !(sub.min_duration > 0.0) {
            return Err(VidsubError::Config("subtitle.min_duration must be positive".to_string()));
        }
        for (name, value) in [
            ("terminal_pause", sub.terminal_pause),
            ("comma_pause", sub.comma_pause),
            ("default_pause", sub.default_pause),
        ] {
            if !(value >= 0.0) {
                return Err(VidsubError::Config(format!("subtitle.{} must not be negative", name)));
            }
        }

        if self.translate.backends.is_empty() {
            return Err(VidsubError::Config("translate.backends must not be empty".to_string()));
        }
        if let Some(unknown) = self
            .translate
            .backends
            .iter()
            .find(|b| !TRANSLATION_BACKENDS.contains(&b.as_str()))
        {
            return Err(VidsubError::Config(format!(
                "Unknown translation backend '{}'. Valid backends: {}",
                unknown,
                TRANSLATION_BACKENDS.join(", ")
            )));
        }

        if self.transcriber.backends.is_empty() {
            return Err(VidsubError::Config("transcriber.backends must not be empty".to_string()));
        }
        if let Some(unknown) = self
            .transcriber
            .backends
            .iter()
            .find(|b| !TRANSCRIPTION_BACKENDS.contains(&b.as_str()))
        {
            return Err(VidsubError::Config(format!(
                "Unknown transcription backend '{}'. Valid backends: {}",
                unknown,
                TRANSCRIPTION_BACKENDS.join(", ")
            )));
        }

        let style = &self.media.style;
        for colour in [&style.primary_colour, &style.outline_colour, &style.back_colour]
            .into_iter()
            .flatten()
        {
            parse_colour(colour)?;
        }

        Ok(())
    }
}
