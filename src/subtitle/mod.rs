// Subtitle model and text-to-subtitle conversion
//
// - segment: splitting raw text into cue-sized pieces
// - timing: assigning start/end times to pieces
// - document: Cue and Document types with their ordering invariants
// - srt: SubRip serialization and parsing
// - merge: combining original and translated tracks

pub mod document;
pub mod merge;
pub mod segment;
pub mod srt;
pub mod timing;

pub use document::{Cue, Document};
pub use merge::{stack_below, MergeLayout};
pub use segment::{Segmenter, Segments};
pub use srt::{format_srt_time, parse_srt, read_srt, to_srt, write_srt};
pub use timing::Timer;

use crate::config::SubtitleConfig;
use crate::error::Result;

/// Segment `text` and time the pieces into a subtitle document.
pub fn subtitles_from_text(text: &str, config: &SubtitleConfig) -> Result<Document> {
    let segments = Segmenter::new(config.max_segment_len).segments(text)?;
    Timer::from_config(config).assign(segments)
}
