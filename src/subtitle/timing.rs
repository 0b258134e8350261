//! Assigning display times to segmented text.

use crate::config::SubtitleConfig;
use crate::error::{Result, VidsubError};
use super::document::{Cue, Document};
use super::segment::SENTENCE_TERMINALS;

/// Punctuation that earns the shorter trailing pause
pub const COMMA_CLASS: &[char] = &[',', '，', '、', ';', '；', ':', '：'];

/// Per-character duration model with a trailing pause and a minimum duration floor.
#[derive(Debug, Clone)]
pub struct Timer {
    seconds_per_char: f64,
    min_duration: f64,
    terminal_pause: f64,
    comma_pause: f64,
    default_pause: f64,
    origin: f64,
}

impl Timer {
    pub fn new(seconds_per_char: f64) -> Self {
        let defaults = SubtitleConfig::default();
        Self {
            seconds_per_char,
            min_duration: defaults.min_duration,
            terminal_pause: defaults.terminal_pause,
            comma_pause: defaults.comma_pause,
            default_pause: defaults.default_pause,
            origin: 0.0,
        }
    }

    pub fn from_config(config: &SubtitleConfig) -> Self {
        Self {
            seconds_per_char: config.seconds_per_char,
            min_duration: config.min_duration,
            terminal_pause: config.terminal_pause,
            comma_pause: config.comma_pause,
            default_pause: config.default_pause,
            origin: 0.0,
        }
    }

    pub fn with_min_duration(mut self, min_duration: f64) -> Self {
        self.min_duration = min_duration;
        self
    }

    /// Time at which the first cue starts
    pub fn with_origin(mut self, origin: f64) -> Self {
        self.origin = origin;
        self
    }

    /// Display duration for one cue, never below the floor
    pub fn duration_for(&self, text: &str) -> f64 {
        let base = text.chars().count() as f64 * self.seconds_per_char;
        let pause = match text.chars().last() {
            Some(c) if SENTENCE_TERMINALS.contains(&c) => self.terminal_pause,
            Some(c) if COMMA_CLASS.contains(&c) => self.comma_pause,
            _ => self.default_pause,
        };
        (base + pause).max(self.min_duration)
    }

    /// Walk the cues once, advancing a running clock from the origin.
    pub fn assign<I, S>(&self, cues: I) -> Result<Document>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut clock = self.origin;
        let mut timed = Vec::new();

        for text in cues {
            let text = text.into();
            let start = clock;
            let end = start + self.duration_for(&text);
            timed.push(Cue::new(text, start, end)?);
            clock = end;
        }

        if timed.is_empty() {
            return Err(VidsubError::NoSegments);
        }

        Document::new(timed)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::from_config(&SubtitleConfig::default())
    }
}
