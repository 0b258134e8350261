use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use super::document::{Cue, Document};

/// How original and translated subtitles are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeLayout {
    /// Translation shown under the original line, burned into the video
    #[default]
    Below,
    /// Two independent subtitle streams muxed into the container
    Separate,
}

impl std::str::FromStr for MergeLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "below" => Ok(Self::Below),
            "separate" => Ok(Self::Separate),
            _ => Err(format!("Invalid layout '{}'. Valid layouts: below, separate", s)),
        }
    }
}

/// Stack each translated line under its original, pairing cues by position.
pub fn stack_below(original: &Document, translated: &Document) -> Result<Document> {
    if original.len() != translated.len() {
        warn!(
            "Original has {} cues but translation has {}; unmatched cues are dropped",
            original.len(),
            translated.len()
        );
    }

    let cues = original
        .iter()
        .zip(translated.iter())
        .map(|(orig, trans)| stacked_cue(orig, trans))
        .collect();

    Document::new(cues)
}

fn stacked_cue(original: &Cue, translated: &Cue) -> Cue {
    original.with_text(format!("{}\n{}", original.text(), translated.text()))
}
