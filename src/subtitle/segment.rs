//! Splitting raw text into cue-sized pieces.

use std::str::CharIndices;

use crate::error::{Result, VidsubError};

/// Characters that close a sentence
pub const SENTENCE_TERMINALS: &[char] = &['.', '。', '!', '！', '?', '？'];

/// Returns true when `c` ends the current cue regardless of its length
pub fn is_break(c: char) -> bool {
    c == '\n' || SENTENCE_TERMINALS.contains(&c)
}

/// Splits text at sentence punctuation, newlines, or when a piece reaches `max_len` characters.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    max_len: usize,
}

impl Segmenter {
    pub fn new(max_len: usize) -> Self {
        Self { max_len: max_len.max(1) }
    }

    /// Sentence splitting only, used to cut text into translation requests
    pub fn unbounded() -> Self {
        Self { max_len: usize::MAX }
    }

    /// Lazily segment `text`. Fails with `EmptyInput` when `text` is only whitespace.
    pub fn segments<'a>(&self, text: &'a str) -> Result<Segments<'a>> {
        if text.trim().is_empty() {
            return Err(VidsubError::EmptyInput);
        }

        Ok(Segments {
            text,
            chars: text.char_indices(),
            max_len: self.max_len,
        })
    }

    /// Eagerly collect all segments.
    pub fn split(&self, text: &str) -> Result<Vec<String>> {
        let segments: Vec<String> = self.segments(text)?.map(str::to_string).collect();
        if segments.is_empty() {
            return Err(VidsubError::NoSegments);
        }
        Ok(segments)
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(50)
    }
}

/// Iterator over the trimmed, non-empty pieces of a text.
///
/// Cloning the iterator yields an independent cursor at the same position.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    chars: CharIndices<'a>,
    max_len: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (start, _) = self.chars.clone().next()?;
            let mut end = self.text.len();
            let mut count = 0;

            for (idx, c) in self.chars.by_ref() {
                count += 1;
                if is_break(c) || count >= self.max_len {
                    end = idx + c.len_utf8();
                    break;
                }
            }

            let piece = self.text[start..end].trim();
            if !piece.is_empty() {
                return Some(piece);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_splits_on_sentence_punctuation() {
        let cues = Segmenter::new(50).split("Hello world. This is a test!").unwrap();
        assert_eq!(cues, vec!["Hello world.", "This is a test!"]);
    }

    #[test]
    fn test_whitespace_only_is_empty_input() {
        assert!(matches!(Segmenter::new(50).segments("   "), Err(VidsubError::EmptyInput)));
        assert!(matches!(Segmenter::new(50).split("\n\t "), Err(VidsubError::EmptyInput)));
    }

    #[test]
    fn test_long_run_splits_at_threshold() {
        let text = "a".repeat(200);
        let cues = Segmenter::new(50).split(&text).unwrap();
        assert_eq!(cues.len(), 4);
        assert!(cues.iter().all(|c| c.chars().count() == 50));
    }

    #[test]
    fn test_threshold_counts_characters_not_bytes() {
        let text = "字".repeat(120);
        let cues = Segmenter::new(50).split(&text).unwrap();
        let lens: Vec<usize> = cues.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lens, vec![50, 50, 20]);
    }

    #[test]
    fn test_cjk_punctuation_and_newlines() {
        let cues = Segmenter::new(50).split("你好。今天天气很好！\n去公园吗？走吧").unwrap();
        assert_eq!(cues, vec!["你好。", "今天天气很好！", "去公园吗？", "走吧"]);
    }

    #[test]
    fn test_drops_whitespace_only_pieces() {
        let cues = Segmenter::new(50).split("One.  \n\n  Two.\n   ").unwrap();
        assert_eq!(cues, vec!["One.", "Two."]);
    }

    #[test]
    fn test_zero_threshold_behaves_as_one() {
        let cues = Segmenter::new(0).split("abc").unwrap();
        assert_eq!(cues, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let segmenter = Segmenter::new(5);
        let segments = segmenter.segments("first second third").unwrap();
        let replay = segments.clone();
        let a: Vec<&str> = segments.collect();
        let b: Vec<&str> = replay.collect();
        assert_eq!(a, b);
        assert_eq!(segmenter.segments("first second third").unwrap().collect::<Vec<_>>(), a);
    }

    #[test]
    fn test_properties_hold_for_mixed_input() {
        let inputs = [
            "Short.",
            "No punctuation at all but quite a long line that keeps going and going past the limit",
            "  leading and trailing  ",
            "Mixed 中文 and English。Questions? Yes! 继续，逗号不会切分",
            "line one\nline two\r\nline three",
        ];
        for max_len in [1, 7, 20, 50] {
            let segmenter = Segmenter::new(max_len);
            for input in inputs {
                let cues = segmenter.split(input).unwrap();
                assert!(!cues.is_empty());
                for cue in &cues {
                    assert!(!cue.trim().is_empty());
                    assert_eq!(cue.trim(), cue);
                    assert!(cue.chars().count() <= max_len, "{:?} longer than {}", cue, max_len);
                }
                assert_eq!(strip_ws(&cues.concat()), strip_ws(input));
            }
        }
    }

    #[test]
    fn test_unbounded_only_splits_on_punctuation() {
        let text = format!("{}. tail", "x".repeat(300));
        let cues = Segmenter::unbounded().split(&text).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].len(), 301);
    }
}
