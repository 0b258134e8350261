//! vidsub - Video Subtitle Translation Workflow
//!
//! Turns speech or existing subtitles in a video into translated subtitles,
//! using yt-dlp, whisper, online translation services and ffmpeg.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod media;
pub mod progress;
pub mod session;
pub mod subtitle;
pub mod transcribe;
pub mod translate;
pub mod workflow;
