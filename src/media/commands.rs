use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, VidsubError};
use super::style::SubtitleStyle;

/// Which step an external tool belongs to, used to classify its failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Media,
    Download,
    Transcription,
}

impl ToolKind {
    fn error(self, message: String) -> VidsubError {
        match self {
            Self::Media => VidsubError::Media(message),
            Self::Download => VidsubError::Download(message),
            Self::Transcription => VidsubError::Transcription(message),
        }
    }
}

/// An external command line: binary, arguments and a short description for logs
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
    pub kind: ToolKind,
}

impl ToolCommand {
    /// Create a new command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
            kind: ToolKind::Media,
        }
    }

    pub fn kind(mut self, kind: ToolKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add a path argument
    pub fn path<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").path(path)
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.path(path)
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Only report errors on stderr
    pub fn quiet(self) -> Self {
        self.arg("-hide_banner").arg("-loglevel").arg("error")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Set audio channels
    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Select a stream for the output
    pub fn map<S: Into<String>>(self, spec: S) -> Self {
        self.arg("-map").arg(spec)
    }

    /// Full command line, for logs and error messages
    pub fn command_line(&self) -> String {
        std::iter::once(self.binary_path.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Execute the command and return its standard output
    pub async fn execute(&self) -> Result<String> {
        debug!("Executing: {}", self.command_line());
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| self.kind.error(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.kind.error(format!(
                "{} failed ({}): {}\nCommand: {}",
                self.description,
                output.status,
                stderr.trim(),
                self.command_line()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builder for the ffmpeg and ffprobe invocations used by the workflow
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, probe_path: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_path: probe_path.into(),
        }
    }

    /// Build subtitle burn-in command
    pub fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
        preset: &str,
        style: &SubtitleStyle,
        additional_options: &[String],
    ) -> Result<ToolCommand> {
        let cmd = ToolCommand::new(&self.binary_path, "Subtitle embedding")
            .quiet()
            .overwrite()
            .input(video_path)
            .video_filter(style.filter_for(subtitle_path)?)
            .video_codec("libx264")
            .arg("-preset")
            .arg(preset)
            .copy_audio()
            .args(additional_options.iter().cloned());

        Ok(cmd.output(output_path))
    }

    /// Build a command adding each subtitle file as its own soft subtitle stream
    pub fn mux_subtitles(
        &self,
        video_path: &Path,
        tracks: &[(PathBuf, String)],
        output_path: &Path,
    ) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.binary_path, "Subtitle track muxing")
            .quiet()
            .overwrite()
            .input(video_path);

        for (path, _) in tracks {
            cmd = cmd.input(path);
        }

        cmd = cmd.map("0:v").map("0:a?");
        for idx in 0..tracks.len() {
            cmd = cmd.map(format!("{}:0", idx + 1));
        }

        cmd = cmd.arg("-c").arg("copy").arg("-c:s").arg("mov_text");
        for (idx, (_, language)) in tracks.iter().enumerate() {
            cmd = cmd
                .arg(format!("-metadata:s:s:{}", idx))
                .arg(format!("language={}", language));
        }

        cmd.output(output_path)
    }

    /// Build audio extraction command
    pub fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> ToolCommand {
        ToolCommand::new(&self.binary_path, "Audio extraction")
            .input(video_path)
            .no_video()
            .arg("-acodec")
            .arg("pcm_s16le")
            .audio_sample_rate(16000)
            .audio_channels(1)
            .overwrite()
            .output(audio_path)
    }

    /// Build a command copying one subtitle stream out to an SRT file
    pub fn extract_subtitle_track(&self, video_path: &Path, stream: usize, output_path: &Path) -> ToolCommand {
        ToolCommand::new(&self.binary_path, "Subtitle extraction")
            .input(video_path)
            .map(format!("0:s:{}", stream))
            .output(output_path)
            .overwrite()
    }

    /// Build ffprobe command listing subtitle stream indices
    pub fn probe_subtitle_streams(&self, video_path: &Path) -> ToolCommand {
        ToolCommand::new(&self.probe_path, "Subtitle stream probe")
            .args(["-v", "error", "-select_streams", "s", "-show_entries", "stream=index", "-of", "csv=p=0"])
            .path(video_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> ToolCommand {
        ToolCommand::new(&self.binary_path, "Version check").arg("-version")
    }

    /// Build ffprobe version check command
    pub fn probe_version_check(&self) -> ToolCommand {
        ToolCommand::new(&self.probe_path, "Probe version check").arg("-version")
    }
}

/// Parse ffprobe's one-index-per-line output
pub fn parse_stream_indices(output: &str) -> Vec<u32> {
    output
        .lines()
        .filter_map(|line| line.trim().trim_end_matches(',').parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MediaCommandBuilder {
        MediaCommandBuilder::new("ffmpeg", "ffprobe")
    }

    #[test]
    fn test_extract_audio_args() {
        let cmd = builder().extract_audio(Path::new("in.mp4"), Path::new("ws/extracted_audio.wav"));
        assert_eq!(
            cmd.command_line(),
            "ffmpeg -i in.mp4 -vn -acodec pcm_s16le -ar 16000 -ac 1 -y ws/extracted_audio.wav"
        );
    }

    #[test]
    fn test_burn_subtitles_args() {
        let style = SubtitleStyle {
            font_size: Some(22),
            ..Default::default()
        };
        let cmd = builder()
            .burn_subtitles(
                Path::new("in.mp4"),
                Path::new("out/subs.srt"),
                Path::new("out/translated_in.mp4"),
                "fast",
                &style,
                &["-crf".to_string(), "23".to_string()],
            )
            .unwrap();

        assert_eq!(
            cmd.args,
            vec![
                "-hide_banner", "-loglevel", "error", "-y", "-i", "in.mp4", "-vf",
                "subtitles='out/subs.srt':force_style='FontSize=22'", "-c:v", "libx264",
                "-preset", "fast", "-c:a", "copy", "-crf", "23", "out/translated_in.mp4",
            ]
        );
    }

    #[test]
    fn test_mux_subtitles_args() {
        let tracks = vec![
            (PathBuf::from("orig.srt"), "zh".to_string()),
            (PathBuf::from("trans.srt"), "en".to_string()),
        ];
        let cmd = builder().mux_subtitles(Path::new("in.mp4"), &tracks, Path::new("out.mp4"));
        assert_eq!(
            cmd.command_line(),
            "ffmpeg -hide_banner -loglevel error -y -i in.mp4 -i orig.srt -i trans.srt \
             -map 0:v -map 0:a? -map 1:0 -map 2:0 -c copy -c:s mov_text \
             -metadata:s:s:0 language=zh -metadata:s:s:1 language=en out.mp4"
        );
    }

    #[test]
    fn test_probe_and_extract_args() {
        let probe = builder().probe_subtitle_streams(Path::new("in.mkv"));
        assert_eq!(
            probe.command_line(),
            "ffprobe -v error -select_streams s -show_entries stream=index -of csv=p=0 in.mkv"
        );

        let extract = builder().extract_subtitle_track(Path::new("in.mkv"), 0, Path::new("ws/extracted_subs.srt"));
        assert_eq!(extract.command_line(), "ffmpeg -i in.mkv -map 0:s:0 ws/extracted_subs.srt -y");
    }

    #[test]
    fn test_parse_stream_indices() {
        assert_eq!(parse_stream_indices("2\n3,\n\n"), vec![2, 3]);
        assert!(parse_stream_indices("").is_empty());
    }

    #[tokio::test]
    async fn test_missing_binary_is_classified_by_kind() {
        let err = ToolCommand::new("definitely-not-a-real-binary-vidsub", "Probe")
            .kind(ToolKind::Download)
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, VidsubError::Download(_)));
    }
}
