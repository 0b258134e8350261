use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use crate::subtitle::MergeLayout;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Workspace directory (overrides the configuration)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Workflow(WorkflowCommand),

    /// Turn a text file into timed SRT subtitles
    Segment {
        /// Text file
        input: PathBuf,

        /// Write the SRT here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Commands that operate on the workspace session or the external tools
#[derive(Subcommand)]
pub enum WorkflowCommand {
    /// Copy a local video into the workspace and start a new session
    Import {
        /// Video file
        video: PathBuf,
    },

    /// Download a video (and its subtitles) into the workspace
    Download {
        /// Video page URL
        url: String,
    },

    /// Extract audio from the session's video
    ExtractAudio,

    /// Recognize speech in the extracted audio
    Transcribe,

    /// Show or replace the text that will be translated
    #[command(group(ArgGroup::new("mode").required(true).args(["from", "show"])))]
    Edit {
        /// Read the new text from this file
        #[arg(long)]
        from: Option<PathBuf>,

        /// Print the current text
        #[arg(long)]
        show: bool,
    },

    /// Translate the edited text
    Translate {
        /// Target language code
        #[arg(short, long)]
        lang: String,
    },

    /// Generate subtitles from the translation and burn them into the video
    Render {
        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show the session and what each step still needs
    Status,

    /// Clear the session
    Reset,

    /// Run the whole pipeline for a video file or URL
    Run {
        /// Video file or URL
        input: String,

        /// Target language code
        #[arg(short, long)]
        lang: String,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Translate a video's existing subtitles
    Subtitle {
        /// Video file
        video: PathBuf,

        /// Target language code
        #[arg(short, long)]
        lang: String,

        /// How to combine original and translated subtitles
        #[arg(long, default_value = "below")]
        layout: MergeLayout,

        /// Fail instead of generating subtitles when none exist
        #[arg(long)]
        no_auto_generate: bool,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Run the whole pipeline for every video in a directory
    Batch {
        /// Directory containing video files
        input_dir: PathBuf,

        /// Target language code
        #[arg(short, long)]
        lang: String,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Burn an SRT file into a video
    Embed {
        /// Input video file
        video: PathBuf,

        /// Subtitle file
        subtitles: PathBuf,

        /// Output video file
        output: PathBuf,
    },

    /// Check that the external tools and translation backends can be used
    Check,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Destination file
        #[arg(default_value = "vidsub.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}
