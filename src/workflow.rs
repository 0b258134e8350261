use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{Config, SubtitleConfig};
use crate::download::{find_sidecar_subtitles, is_url, Download, Downloader, YtDlpDownloader};
use crate::error::{Result, VidsubError};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::progress::with_spinner;
use crate::session::{
    SessionState, Step, Workspace, AUDIO_FILE, AUTO_SUBTITLES_FILE, EDITED_TEXT_FILE,
    EXTRACTED_SUBTITLES_FILE, RECOGNIZED_TEXT_FILE, SUBTITLE_OUTPUT_FILE, TRANSLATED_TEXT_FILE,
};
use crate::subtitle::{read_srt, stack_below, subtitles_from_text, to_srt, write_srt, MergeLayout};
use crate::transcribe::{TranscriberFactory, TranscriberTrait, TranscriptFormat};
use crate::translate::{translate_document, translate_text_content, Translator, TranslatorFactory};

/// Extensions picked up by batch processing
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"];

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

pub struct Workflow {
    config: Config,
    workspace: Workspace,
    media: Box<dyn MediaProcessorTrait>,
    downloader: Box<dyn Downloader>,
    transcriber: Box<dyn TranscriberTrait>,
    translator: Box<dyn Translator>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        let downloader: Box<dyn Downloader> = Box::new(YtDlpDownloader::new(config.download.clone()));
        let transcriber: Box<dyn TranscriberTrait> =
            Box::new(TranscriberFactory::create_chain(&config.transcriber)?);
        let translator: Box<dyn Translator> = Box::new(TranslatorFactory::create_chain(&config.translate)?);
        let workspace = Workspace::new(config.workspace.dir.clone());

        Ok(Self::with_components(
            config,
            workspace,
            media,
            downloader,
            transcriber,
            translator,
        ))
    }

    /// Assemble a workflow from explicit components
    pub fn with_components(
        config: Config,
        workspace: Workspace,
        media: Box<dyn MediaProcessorTrait>,
        downloader: Box<dyn Downloader>,
        transcriber: Box<dyn TranscriberTrait>,
        translator: Box<dyn Translator>,
    ) -> Self {
        Self {
            config,
            workspace,
            media,
            downloader,
            transcriber,
            translator,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Copy a local video into the workspace and start a new session
    pub async fn import_video(&self, source: &Path) -> Result<PathBuf> {
        if !source.is_file() {
            return Err(VidsubError::FileNotFound(source.display().to_string()));
        }
        let file_name = source
            .file_name()
            .ok_or_else(|| VidsubError::Config("Invalid video filename".to_string()))?;

        fs::create_dir_all(self.workspace.dir()).await?;
        let dest = self.workspace.dir().join(file_name);
        if !is_same_file(source, &dest) {
            info!("Importing {} into {}", source.display(), self.workspace.dir().display());
            fs::copy(source, &dest).await?;
        }

        let mut state = SessionState::new();
        state.video_path = Some(dest.clone());
        self.workspace.save(&mut state).await?;
        Ok(dest)
    }

    /// Download a video into the workspace and start a new session
    pub async fn download(&self, url: &str) -> Result<Download> {
        let download = with_spinner(
            "Downloading video",
            self.downloader.download(url, self.workspace.dir()),
        )
        .await?;

        let mut state = SessionState::new();
        state.video_path = Some(download.video_path.clone());
        state.subtitle_paths = download.subtitle_paths.clone();
        self.workspace.save(&mut state).await?;
        Ok(download)
    }

    pub async fn extract_audio(&self) -> Result<PathBuf> {
        let mut state = self.workspace.load().await?;
        state.require(Step::ExtractAudio)?;
        let video = recorded(&state.video_path, Step::ExtractAudio, "video")?;

        let audio = self.workspace.path(AUDIO_FILE);
        with_spinner("Extracting audio", self.media.extract_audio(&video, &audio)).await?;

        state.audio_path = Some(audio.clone());
        self.workspace.save(&mut state).await?;
        Ok(audio)
    }

    /// Recognize speech into `audio_text.txt`; the edited text starts as a copy
    pub async fn transcribe(&self) -> Result<String> {
        let mut state = self.workspace.load().await?;
        state.require(Step::Transcribe)?;
        let audio = recorded(&state.audio_path, Step::Transcribe, "audio")?;

        let recognized = self.workspace.path(RECOGNIZED_TEXT_FILE);
        with_spinner(
            "Transcribing audio",
            self.transcriber.transcribe(&audio, TranscriptFormat::Text, &recognized),
        )
        .await?;

        let text = fs::read_to_string(&recognized).await?;
        let edited = self.workspace.path(EDITED_TEXT_FILE);
        fs::write(&edited, &text).await?;
        info!("Recognized {} characters", text.chars().count());

        state.recognized_text_path = Some(recognized);
        state.edited_text_path = Some(edited);
        state.translated_text_path = None;
        self.workspace.save(&mut state).await?;
        Ok(text)
    }

    /// Replace the edited text. Any earlier translation is discarded.
    pub async fn save_edited_text(&self, text: &str) -> Result<PathBuf> {
        if text.trim().is_empty() {
            return Err(VidsubError::EmptyInput);
        }

        let mut state = self.workspace.load().await?;
        fs::create_dir_all(self.workspace.dir()).await?;
        let edited = self.workspace.path(EDITED_TEXT_FILE);
        fs::write(&edited, text).await?;

        state.edited_text_path = Some(edited.clone());
        state.translated_text_path = None;
        self.workspace.save(&mut state).await?;
        Ok(edited)
    }

    pub async fn edited_text(&self) -> Result<String> {
        let state = self.workspace.load().await?;
        match state.edited_text_path.filter(|p| p.exists()) {
            Some(path) => Ok(fs::read_to_string(path).await?),
            None => Err(VidsubError::MissingStep {
                step: "edit".to_string(),
                missing: vec!["edited text".to_string()],
            }),
        }
    }

    pub async fn translate(&self, target_language: &str) -> Result<PathBuf> {
        let mut state = self.workspace.load().await?;
        state.require(Step::Translate)?;
        let edited = recorded(&state.edited_text_path, Step::Translate, "edited text")?;

        let text = fs::read_to_string(&edited).await?;
        let translated = translate_text_content(
            self.translator.as_ref(),
            &text,
            target_language,
            self.config.translate.paragraph_limit,
        )
        .await?;

        let output = self.workspace.path(TRANSLATED_TEXT_FILE);
        fs::write(&output, &translated).await?;

        state.translated_text_path = Some(output.clone());
        state.target_language = Some(target_language.to_string());
        self.workspace.save(&mut state).await?;
        Ok(output)
    }

    /// Time the translated text into subtitles and burn them into the video
    pub async fn render(&self, output_dir: Option<&Path>) -> Result<PathBuf> {
        let mut state = self.workspace.load().await?;
        state.require(Step::Render)?;
        let video = recorded(&state.video_path, Step::Render, "video")?;
        let translated = recorded(&state.translated_text_path, Step::Render, "translated text")?;

        let text = fs::read_to_string(&translated).await?;
        let document = subtitles_from_text(&text, &self.config.subtitle)?;
        info!(
            "Generated {} subtitle cues covering {:.1}s",
            document.len(),
            document.duration()
        );

        let output_dir = self.output_dir(output_dir);
        fs::create_dir_all(&output_dir).await?;
        let subtitle_path = output_dir.join(SUBTITLE_OUTPUT_FILE);
        write_srt(&document, &subtitle_path).await?;

        let output_video = output_dir.join(format!("translated_{}", file_name(&video)?));
        with_spinner(
            "Burning subtitles",
            self.media.burn_subtitles(&video, &subtitle_path, &output_video),
        )
        .await?;

        state.subtitle_path = Some(subtitle_path);
        state.output_video_path = Some(output_video.clone());
        self.workspace.save(&mut state).await?;
        info!("Output video: {}", output_video.display());
        Ok(output_video)
    }

    pub async fn status(&self) -> Result<SessionState> {
        self.workspace.load().await
    }

    pub async fn reset(&self) -> Result<bool> {
        self.workspace.reset().await
    }

    /// Full pipeline for a local file or URL: import, audio, text, translation, render
    pub async fn run(&self, input: &str, target_language: &str, output_dir: Option<&Path>) -> Result<PathBuf> {
        if is_url(input) {
            self.download(input).await?;
        } else {
            self.import_video(Path::new(input)).await?;
        }
        self.run_imported(target_language, output_dir).await
    }

    async fn run_imported(&self, target_language: &str, output_dir: Option<&Path>) -> Result<PathBuf> {
        self.extract_audio().await?;
        self.transcribe().await?;
        self.translate(target_language).await?;
        self.render(output_dir).await
    }

    /// Translate a video's existing subtitles and attach them in the given layout
    pub async fn process_existing_subtitles(
        &self,
        video_path: &Path,
        target_language: &str,
        layout: MergeLayout,
        auto_generate: bool,
        output_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        if !video_path.is_file() {
            return Err(VidsubError::FileNotFound(video_path.display().to_string()));
        }

        let source = self.find_subtitle_source(video_path, auto_generate).await?;
        info!("Using subtitles from {}", source.display());
        let original = read_srt(&source).await?;
        let translated = translate_document(self.translator.as_ref(), &original, target_language).await?;

        let output_dir = self.output_dir(output_dir);
        fs::create_dir_all(&output_dir).await?;
        let stem = file_stem(video_path)?;

        match layout {
            MergeLayout::Below => {
                let merged = stack_below(&original, &translated)?;
                let subtitle_path = output_dir.join(format!("{}_{}_bilingual.srt", stem, target_language));
                write_srt(&merged, &subtitle_path).await?;

                let output = output_dir.join(format!("translated_{}", file_name(video_path)?));
                with_spinner(
                    "Burning bilingual subtitles",
                    self.media.burn_subtitles(video_path, &subtitle_path, &output),
                )
                .await?;
                Ok(output)
            }
            MergeLayout::Separate => {
                let subtitle_path = output_dir.join(format!("{}_{}.srt", stem, target_language));
                write_srt(&translated, &subtitle_path).await?;

                let source_language = self
                    .config
                    .transcriber
                    .language
                    .clone()
                    .unwrap_or_else(|| "und".to_string());
                let tracks = vec![
                    (source, source_language),
                    (subtitle_path, target_language.to_string()),
                ];
                // mov_text streams need an mp4 container
                let output = output_dir.join(format!("translated_{}.mp4", stem));
                with_spinner(
                    "Muxing subtitle tracks",
                    self.media.mux_subtitles(video_path, &tracks, &output),
                )
                .await?;
                Ok(output)
            }
        }
    }

    /// Sidecar file, then embedded stream, then speech recognition
    async fn find_subtitle_source(&self, video_path: &Path, auto_generate: bool) -> Result<PathBuf> {
        let sidecars = find_sidecar_subtitles(video_path);
        let exact = video_path.with_extension("srt");
        if let Some(path) = sidecars
            .iter()
            .find(|p| p.file_name() == exact.file_name())
            .or_else(|| sidecars.first())
        {
            return Ok(path.clone());
        }

        fs::create_dir_all(self.workspace.dir()).await?;

        let streams = match self.media.probe_subtitle_streams(video_path).await {
            Ok(streams) => streams,
            Err(e) => {
                warn!("Could not probe subtitle streams: {}", e);
                Vec::new()
            }
        };
        if !streams.is_empty() {
            info!("Found {} embedded subtitle stream(s), extracting the first", streams.len());
            let output = self.workspace.path(EXTRACTED_SUBTITLES_FILE);
            self.media.extract_subtitle_track(video_path, 0, &output).await?;
            return Ok(output);
        }

        if auto_generate {
            info!("No subtitles found, generating them from speech");
            let audio = self.workspace.path(AUDIO_FILE);
            with_spinner("Extracting audio", self.media.extract_audio(video_path, &audio)).await?;
            let output = self.workspace.path(AUTO_SUBTITLES_FILE);
            with_spinner(
                "Generating subtitles",
                self.transcriber.transcribe(&audio, TranscriptFormat::Srt, &output),
            )
            .await?;
            return Ok(output);
        }

        Err(VidsubError::FileNotFound(format!(
            "no subtitles for {}",
            video_path.display()
        )))
    }

    /// Run the full pipeline for every video under `input_dir`
    pub async fn batch(&self, input_dir: &Path, target_language: &str, output_dir: Option<&Path>) -> Result<BatchSummary> {
        if !input_dir.is_dir() {
            return Err(VidsubError::Config(format!(
                "{} is not a directory",
                input_dir.display()
            )));
        }

        let output_root = self.output_dir(output_dir);
        let videos = find_videos(input_dir, &[self.workspace.dir(), output_root.as_path()]);
        info!("Found {} video files to process", videos.len());

        let mut summary = BatchSummary::default();
        for video in videos {
            let video_output = output_root.join(file_stem(&video)?);
            let result = match self.import_video(&video).await {
                Ok(_) => self.run_imported(target_language, Some(&video_output)).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(output) => {
                    info!("Successfully processed: {} -> {}", video.display(), output.display());
                    summary.processed.push(video);
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", video.display(), e);
                    summary.failed.push((video, e.to_string()));
                }
            }
        }

        Ok(summary)
    }

    /// Burn an existing SRT file into a video
    pub async fn embed(&self, video_path: &Path, subtitle_path: &Path, output_path: &Path) -> Result<()> {
        with_spinner(
            "Burning subtitles",
            self.media.burn_subtitles(video_path, subtitle_path, output_path),
        )
        .await
    }

    /// Availability of each external tool and translation backend, in pipeline order
    pub async fn check(&self) -> Vec<(&'static str, Result<String>)> {
        let ffmpeg = match self.media.check_availability().await {
            Ok(()) => self.media.get_version_info().await,
            Err(e) => Err(e),
        };
        let mut report = vec![
            ("ffmpeg", ffmpeg),
            ("ffprobe", self.media.get_probe_version_info().await),
            ("downloader", self.downloader.check_availability().await),
            (
                "transcriber",
                self.transcriber
                    .check_availability()
                    .await
                    .map(|_| "available".to_string()),
            ),
        ];
        report.extend(self.translator.check_backends().await);
        report
    }

    fn output_dir(&self, output_dir: Option<&Path>) -> PathBuf {
        output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.workspace.output_dir.clone())
    }
}

/// Segment and time a text file, returning the SRT and optionally writing it
pub async fn segment_file(input: &Path, output: Option<&Path>, config: &SubtitleConfig) -> Result<String> {
    if !input.is_file() {
        return Err(VidsubError::FileNotFound(input.display().to_string()));
    }
    let text = fs::read_to_string(input).await?;
    let document = subtitles_from_text(&text, config)?;
    if let Some(output) = output {
        write_srt(&document, output).await?;
    }
    Ok(to_srt(&document))
}

/// Video files under `dir`, sorted, skipping anything inside `exclude`.
///
/// Directories are compared in resolved form, so `.` and a relative
/// `.vidsub/workspace` still prune each other.
pub fn find_videos(dir: &Path, exclude: &[&Path]) -> Vec<PathBuf> {
    let excluded: Vec<PathBuf> = exclude.iter().map(|p| resolve_path(p)).collect();

    let mut videos: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| {
            !e.file_type().is_dir() || !excluded.iter().any(|ex| resolve_path(e.path()).starts_with(ex))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        })
        .collect();
    videos.sort();
    videos
}

/// Canonical form when the path exists, else absolute against the working directory
fn resolve_path(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn recorded(path: &Option<PathBuf>, step: Step, what: &str) -> Result<PathBuf> {
    path.clone().ok_or_else(|| VidsubError::MissingStep {
        step: step.name().to_string(),
        missing: vec![what.to_string()],
    })
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| VidsubError::Config(format!("Invalid file name: {}", path.display())))
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| VidsubError::Config(format!("Invalid file name: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    use crate::download::MockDownloader;
    use crate::media::MockMediaProcessorTrait;
    use crate::transcribe::MockTranscriberTrait;
    use crate::translate::placeholder::PlaceholderTranslator;
    use crate::translate::MockTranslator;

    fn test_config(temp: &TempDir) -> Config {
        let mut config = Config::default();
        config.workspace.dir = temp.path().join("ws");
        config.workspace.output_dir = temp.path().join("out");
        config
    }

    fn workflow(
        temp: &TempDir,
        media: MockMediaProcessorTrait,
        transcriber: MockTranscriberTrait,
        translator: Box<dyn Translator>,
    ) -> Workflow {
        workflow_with_downloader(temp, media, MockDownloader::new(), transcriber, translator)
    }

    fn workflow_with_downloader(
        temp: &TempDir,
        media: MockMediaProcessorTrait,
        downloader: MockDownloader,
        transcriber: MockTranscriberTrait,
        translator: Box<dyn Translator>,
    ) -> Workflow {
        let config = test_config(temp);
        let workspace = Workspace::new(config.workspace.dir.clone());
        Workflow::with_components(
            config,
            workspace,
            Box::new(media),
            Box::new(downloader),
            Box::new(transcriber),
            translator,
        )
    }

    fn uppercase_translator() -> Box<dyn Translator> {
        let mut translator = MockTranslator::new();
        translator.expect_name().return_const("upper");
        translator
            .expect_translate()
            .returning(|text, _| Ok(text.to_uppercase()));
        Box::new(translator)
    }

    fn pipeline_media() -> MockMediaProcessorTrait {
        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(|_, audio| {
            std::fs::write(audio, b"RIFF").unwrap();
            Ok(())
        });
        media.expect_burn_subtitles().returning(|_, srt, output| {
            assert!(srt.exists());
            std::fs::write(output, b"video").unwrap();
            Ok(())
        });
        media
    }

    fn text_transcriber(text: &'static str) -> MockTranscriberTrait {
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_name().return_const("mock");
        transcriber
            .expect_transcribe()
            .withf(|_, format, _| *format == TranscriptFormat::Text)
            .returning(move |_, _, output| {
                std::fs::write(output, text).unwrap();
                Ok(output.to_path_buf())
            });
        transcriber
    }

    #[tokio::test]
    async fn test_run_local_file() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("clip.mp4");
        video.touch().unwrap();

        let wf = workflow(
            &temp,
            pipeline_media(),
            text_transcriber("Hello world. This is a test!"),
            uppercase_translator(),
        );

        let output = wf.run(video.path().to_str().unwrap(), "en", None).await.unwrap();
        assert_eq!(output, temp.path().join("out").join("translated_clip.mp4"));
        assert!(output.exists());

        let srt = std::fs::read_to_string(temp.path().join("out").join(SUBTITLE_OUTPUT_FILE)).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> "));
        assert!(srt.contains("HELLO WORLD."));
        assert!(srt.contains("THIS IS A TEST!"));

        let state = wf.status().await.unwrap();
        assert_eq!(state.target_language.as_deref(), Some("en"));
        assert_eq!(state.video_path, Some(temp.path().join("ws").join("clip.mp4")));
        for step in Step::ALL {
            assert!(state.missing_for(step).is_empty(), "{step} still missing inputs");
        }
    }

    #[tokio::test]
    async fn test_run_url_downloads_into_workspace() {
        let temp = TempDir::new().unwrap();
        let mut downloader = MockDownloader::new();
        downloader
            .expect_download()
            .withf(|url, _| url == "https://example.com/watch?v=abc")
            .times(1)
            .returning(|_, dir| {
                std::fs::create_dir_all(dir).unwrap();
                let video = dir.join("downloaded_video.mp4");
                let subs = dir.join("downloaded_video.zh-CN.srt");
                std::fs::write(&video, b"video").unwrap();
                std::fs::write(&subs, "1\n00:00:00,000 --> 00:00:01,000\n你好\n").unwrap();
                Ok(Download {
                    video_path: video,
                    subtitle_paths: vec![subs],
                })
            });

        let wf = workflow_with_downloader(
            &temp,
            pipeline_media(),
            downloader,
            text_transcriber("Guten Tag."),
            uppercase_translator(),
        );

        let output = wf.run("https://example.com/watch?v=abc", "en", None).await.unwrap();
        assert_eq!(output, temp.path().join("out").join("translated_downloaded_video.mp4"));

        let ws = temp.path().join("ws");
        let state = wf.status().await.unwrap();
        assert_eq!(state.video_path, Some(ws.join("downloaded_video.mp4")));
        assert_eq!(state.subtitle_paths, vec![ws.join("downloaded_video.zh-CN.srt")]);
        assert!(state.output_video_path.is_some());
    }

    #[tokio::test]
    async fn test_translate_requires_edited_text() {
        let temp = TempDir::new().unwrap();
        let wf = workflow(
            &temp,
            MockMediaProcessorTrait::new(),
            MockTranscriberTrait::new(),
            uppercase_translator(),
        );

        match wf.translate("en").await.unwrap_err() {
            VidsubError::MissingStep { step, missing } => {
                assert_eq!(step, "translate");
                assert_eq!(missing, vec!["edited text".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_edit_discards_stale_translation() {
        let temp = TempDir::new().unwrap();
        let wf = workflow(
            &temp,
            MockMediaProcessorTrait::new(),
            MockTranscriberTrait::new(),
            uppercase_translator(),
        );

        wf.save_edited_text("First draft.").await.unwrap();
        wf.translate("en").await.unwrap();
        assert!(wf.status().await.unwrap().translated_text_path.is_some());

        wf.save_edited_text("Second draft.").await.unwrap();
        assert_eq!(wf.edited_text().await.unwrap(), "Second draft.");
        let state = wf.status().await.unwrap();
        assert!(state.translated_text_path.is_none());
        assert!(matches!(wf.save_edited_text(" ").await, Err(VidsubError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_existing_sidecar_below_layout() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("movie.mp4");
        video.touch().unwrap();
        temp.child("movie.srt")
            .write_str("1\n00:00:01,000 --> 00:00:02,000\n你好\n\n2\n00:00:03,000 --> 00:00:04,000\n世界\n")
            .unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_probe_subtitle_streams().never();
        media.expect_burn_subtitles().times(1).returning(|_, srt, output| {
            let content = std::fs::read_to_string(srt).unwrap();
            assert!(content.contains("你好\n[English Translation] 你好"));
            std::fs::write(output, b"video").unwrap();
            Ok(())
        });

        let wf = workflow(&temp, media, MockTranscriberTrait::new(), Box::new(PlaceholderTranslator));
        let output = wf
            .process_existing_subtitles(video.path(), "en", MergeLayout::Below, true, None)
            .await
            .unwrap();
        assert_eq!(output, temp.path().join("out").join("translated_movie.mp4"));
        assert!(temp.path().join("out").join("movie_en_bilingual.srt").exists());
    }

    #[tokio::test]
    async fn test_embedded_stream_separate_layout() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("movie.mkv");
        video.touch().unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_probe_subtitle_streams().returning(|_| Ok(vec![2]));
        media
            .expect_extract_subtitle_track()
            .withf(|_, stream, _| *stream == 0)
            .times(1)
            .returning(|_, _, output| {
                std::fs::write(output, "1\n00:00:00,500 --> 00:00:01,500\nBonjour\n").unwrap();
                Ok(())
            });
        media
            .expect_mux_subtitles()
            .times(1)
            .returning(|_, tracks, _| {
                assert_eq!(tracks.len(), 2);
                assert_eq!(tracks[0].1, "und");
                assert_eq!(tracks[1].1, "ja");
                Ok(())
            });

        let wf = workflow(&temp, media, MockTranscriberTrait::new(), uppercase_translator());
        let output = wf
            .process_existing_subtitles(video.path(), "ja", MergeLayout::Separate, false, None)
            .await
            .unwrap();
        assert_eq!(output, temp.path().join("out").join("translated_movie.mp4"));

        let translated = std::fs::read_to_string(temp.path().join("out").join("movie_ja.srt")).unwrap();
        assert!(translated.contains("BONJOUR"));
    }

    #[tokio::test]
    async fn test_no_subtitles_without_auto_generation() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("bare.mp4");
        video.touch().unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_probe_subtitle_streams().returning(|_| Ok(Vec::new()));
        media.expect_extract_audio().never();

        let wf = workflow(&temp, media, MockTranscriberTrait::new(), uppercase_translator());
        let err = wf
            .process_existing_subtitles(video.path(), "en", MergeLayout::Below, false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, VidsubError::FileNotFound(_)));
    }

    fn generating_media(probe: Result<Vec<u32>>) -> MockMediaProcessorTrait {
        let mut media = MockMediaProcessorTrait::new();
        media.expect_probe_subtitle_streams().times(1).return_once(move |_| probe);
        media.expect_extract_subtitle_track().never();
        media.expect_extract_audio().times(1).returning(|_, audio| {
            assert!(audio.ends_with(AUDIO_FILE));
            std::fs::write(audio, b"RIFF").unwrap();
            Ok(())
        });
        media.expect_burn_subtitles().times(1).returning(|_, srt, output| {
            let content = std::fs::read_to_string(srt).unwrap();
            assert!(content.contains("Hallo\nHALLO"));
            std::fs::write(output, b"video").unwrap();
            Ok(())
        });
        media
    }

    fn srt_transcriber() -> MockTranscriberTrait {
        let mut transcriber = MockTranscriberTrait::new();
        transcriber.expect_name().return_const("mock");
        transcriber
            .expect_transcribe()
            .withf(|_, format, output| *format == TranscriptFormat::Srt && output.ends_with(AUTO_SUBTITLES_FILE))
            .times(1)
            .returning(|_, _, output| {
                std::fs::write(output, "1\n00:00:00,000 --> 00:00:01,200\nHallo\n").unwrap();
                Ok(output.to_path_buf())
            });
        transcriber
    }

    #[tokio::test]
    async fn test_auto_generates_subtitles_when_none_exist() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("bare.mp4");
        video.touch().unwrap();

        let wf = workflow(&temp, generating_media(Ok(Vec::new())), srt_transcriber(), uppercase_translator());
        let output = wf
            .process_existing_subtitles(video.path(), "en", MergeLayout::Below, true, None)
            .await
            .unwrap();
        assert_eq!(output, temp.path().join("out").join("translated_bare.mp4"));
        assert!(temp.path().join("ws").join(AUTO_SUBTITLES_FILE).exists());
    }

    #[tokio::test]
    async fn test_probe_failure_falls_through_to_generation() {
        let temp = TempDir::new().unwrap();
        let video = temp.child("odd.mp4");
        video.touch().unwrap();

        let media = generating_media(Err(VidsubError::Media("ffprobe: Invalid data".to_string())));
        let wf = workflow(&temp, media, srt_transcriber(), uppercase_translator());
        let output = wf
            .process_existing_subtitles(video.path(), "en", MergeLayout::Below, true, None)
            .await
            .unwrap();
        assert_eq!(output, temp.path().join("out").join("translated_odd.mp4"));
        assert!(temp.path().join("out").join("odd_en_bilingual.srt").exists());
    }

    #[tokio::test]
    async fn test_batch_processes_videos_only() {
        let temp = TempDir::new().unwrap();
        let input = temp.child("videos");
        input.child("a.mp4").touch().unwrap();
        input.child("nested/b.MKV").touch().unwrap();
        input.child("notes.txt").touch().unwrap();

        let wf = workflow(
            &temp,
            pipeline_media(),
            text_transcriber("Bonjour."),
            uppercase_translator(),
        );

        let summary = wf.batch(input.path(), "en", None).await.unwrap();
        assert_eq!(summary.processed.len(), 2);
        assert!(summary.failed.is_empty());
        assert!(temp.path().join("out").join("a").join("translated_a.mp4").exists());
        assert!(temp.path().join("out").join("b").join("translated_b.MKV").exists());
    }

    #[tokio::test]
    async fn test_check_reports_each_tool() {
        let temp = TempDir::new().unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_check_availability().returning(|| Ok(()));
        media
            .expect_get_version_info()
            .returning(|| Ok("ffmpeg version 6.1".to_string()));
        media
            .expect_get_probe_version_info()
            .returning(|| Err(VidsubError::Media("ffprobe not found".to_string())));

        let mut downloader = MockDownloader::new();
        downloader
            .expect_check_availability()
            .returning(|| Ok("2024.08.06".to_string()));

        let mut transcriber = MockTranscriberTrait::new();
        transcriber
            .expect_check_availability()
            .returning(|| Err(VidsubError::Transcription("no whisper".to_string())));

        let mut translator = MockTranslator::new();
        translator.expect_check_backends().times(1).returning(|| {
            vec![
                ("baidu", Err(VidsubError::MissingCredentials {
                    backend: "baidu".to_string(),
                    what: "app_id".to_string(),
                })),
                ("placeholder", Ok("labels text only".to_string())),
            ]
        });

        let config = test_config(&temp);
        let workspace = Workspace::new(config.workspace.dir.clone());
        let wf = Workflow::with_components(
            config,
            workspace,
            Box::new(media),
            Box::new(downloader),
            Box::new(transcriber),
            Box::new(translator),
        );

        let report = wf.check().await;
        let names: Vec<&str> = report.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["ffmpeg", "ffprobe", "downloader", "transcriber", "baidu", "placeholder"]
        );
        assert_eq!(report[0].1.as_deref().unwrap(), "ffmpeg version 6.1");
        assert!(report[1].1.is_err());
        assert!(report[2].1.is_ok());
        assert!(report[3].1.is_err());
        assert!(matches!(report[4].1, Err(VidsubError::MissingCredentials { .. })));
        assert!(report[5].1.is_ok());
    }

    #[test]
    fn test_find_videos_skips_excluded_dirs() {
        let temp = TempDir::new().unwrap();
        temp.child("one.webm").touch().unwrap();
        temp.child(".vidsub/workspace/one.webm").touch().unwrap();

        let excluded = temp.path().join(".vidsub");
        let videos = find_videos(temp.path(), &[excluded.as_path()]);
        assert_eq!(videos, vec![temp.path().join("one.webm")]);
    }

    #[test]
    fn test_find_videos_excludes_across_path_spellings() {
        let temp = TempDir::new().unwrap();
        temp.child("videos/talk.mp4").touch().unwrap();
        temp.child(".vidsub/workspace/talk.mp4").touch().unwrap();
        temp.child(".vidsub/output/talk/translated_talk.mp4").touch().unwrap();

        // Root reached through `..`, excludes spelled directly
        let root = temp.path().join("videos").join("..");
        let workspace = temp.path().join(".vidsub/workspace");
        let output = temp.path().join(".vidsub/output");
        let videos = find_videos(&root, &[workspace.as_path(), output.as_path()]);
        assert_eq!(videos, vec![root.join("videos").join("talk.mp4")]);
    }

    #[tokio::test]
    async fn test_segment_file() {
        let temp = TempDir::new().unwrap();
        let input = temp.child("speech.txt");
        input.write_str("Hello world. This is a test!").unwrap();
        let output = temp.path().join("speech.srt");

        let srt = segment_file(input.path(), Some(&output), &SubtitleConfig::default())
            .await
            .unwrap();
        assert!(srt.contains("Hello world."));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), srt);

        let missing = segment_file(&temp.path().join("none.txt"), None, &SubtitleConfig::default()).await;
        assert!(matches!(missing, Err(VidsubError::FileNotFound(_))));
    }
}
