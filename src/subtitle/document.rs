use serde::Serialize;

use crate::error::{Result, VidsubError};

/// One timed subtitle entry. Times are seconds from the start of the track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cue {
    text: String,
    start: f64,
    end: f64,
}

impl Cue {
    pub fn new<S: Into<String>>(text: S, start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            return Err(VidsubError::InvalidTiming(format!(
                "cue times must be finite and non-negative (start {}, end {})",
                start, end
            )));
        }
        if end <= start {
            return Err(VidsubError::InvalidTiming(format!(
                "cue ends at {} but starts at {}",
                end, start
            )));
        }

        Ok(Self {
            text: text.into(),
            start,
            end,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Same timing, different text
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        Self {
            text: text.into(),
            start: self.start,
            end: self.end,
        }
    }
}

/// An ordered, non-overlapping subtitle track.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    cues: Vec<Cue>,
}

impl Document {
    pub fn new(cues: Vec<Cue>) -> Result<Self> {
        for (idx, pair) in cues.windows(2).enumerate() {
            if pair[1].start < pair[0].end {
                return Err(VidsubError::InvalidTiming(format!(
                    "cue {} starts at {} before cue {} ends at {}",
                    idx + 2,
                    pair[1].start,
                    idx + 1,
                    pair[0].end
                )));
            }
        }
        Ok(Self { cues })
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    /// End time of the last cue
    pub fn duration(&self) -> f64 {
        self.cues.last().map(|c| c.end).unwrap_or(0.0)
    }

    /// Replace every text while keeping the timing. `texts` must match the cue count.
    pub fn with_texts(&self, texts: Vec<String>) -> Result<Self> {
        if texts.len() != self.cues.len() {
            return Err(VidsubError::InvalidTiming(format!(
                "expected {} texts, got {}",
                self.cues.len(),
                texts.len()
            )));
        }

        Ok(Self {
            cues: self
                .cues
                .iter()
                .zip(texts)
                .map(|(cue, text)| cue.with_text(text))
                .collect(),
        })
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Cue;
    type IntoIter = std::slice::Iter<'a, Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}
