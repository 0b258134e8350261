use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tokio::fs;
use tracing::{info, warn};

use crate::error::{Result, VidsubError};
use super::document::{Cue, Document};

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timing pattern is valid")
});

/// Format time in seconds to SRT time format (HH:MM:SS,mmm), rounded to the nearest millisecond
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Render a document as SRT text
pub fn to_srt(document: &Document) -> String {
    let mut srt_content = String::new();

    for (index, cue) in document.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(cue.start()),
            format_srt_time(cue.end()),
            cue.text().trim()
        ));
    }

    srt_content
}

/// Parse SRT text.
///
/// Overlapping cues are pulled forward to the previous end; cues left without
/// a positive duration are dropped.
pub fn parse_srt(content: &str) -> Result<Document> {
    let content = content.trim_start_matches('\u{feff}');
    let mut cues: Vec<Cue> = Vec::new();
    let mut lines = content.lines().map(|l| l.trim_end_matches('\r')).enumerate().peekable();

    while let Some((line_no, line)) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }

        // The index line is optional; some tools omit it.
        let (timing_no, timing) = if TIMING_LINE.is_match(line.trim()) {
            (line_no, line)
        } else {
            match lines.next() {
                Some(next) => next,
                None => {
                    return Err(VidsubError::SubtitleParse {
                        line: line_no + 1,
                        message: "missing timing line".to_string(),
                    })
                }
            }
        };

        let caps = TIMING_LINE.captures(timing.trim()).ok_or_else(|| VidsubError::SubtitleParse {
            line: timing_no + 1,
            message: format!("invalid timing line '{}'", timing),
        })?;

        let mut start = captured_seconds(&caps, 1);
        let end = captured_seconds(&caps, 5);

        let mut text_lines = Vec::new();
        while let Some((_, next)) = lines.peek() {
            if next.trim().is_empty() {
                break;
            }
            text_lines.push(next.trim().to_string());
            lines.next();
        }

        if let Some(prev) = cues.last() {
            if start < prev.end() {
                warn!("Cue at line {} overlaps the previous cue, shifting start", timing_no + 1);
                start = prev.end();
            }
        }
        if end <= start {
            warn!("Dropping cue at line {} without positive duration", timing_no + 1);
            continue;
        }

        cues.push(Cue::new(text_lines.join("\n"), start, end)?);
    }

    Document::new(cues)
}

fn captured_seconds(caps: &regex::Captures<'_>, first: usize) -> f64 {
    let part = |i: usize| caps[first + i].parse::<u64>().unwrap_or(0);
    let millis = part(0) * 3_600_000 + part(1) * 60_000 + part(2) * 1_000 + part(3);
    millis as f64 / 1000.0
}

/// Write a document to an SRT file
pub async fn write_srt<P: AsRef<Path>>(document: &Document, output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(output_path, to_srt(document)).await?;

    info!("SRT file generated with {} cues", document.len());
    Ok(())
}

/// Read and parse an SRT file
pub async fn read_srt<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(VidsubError::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path).await?;
    parse_srt(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn doc(cues: &[(&str, f64, f64)]) -> Document {
        Document::new(
            cues.iter()
                .map(|(t, s, e)| Cue::new(*t, *s, *e).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[test]
    fn test_format_srt_time_rounds_to_millisecond() {
        assert_eq!(format_srt_time(2.4 + 0.6), "00:00:03,000");
        assert_eq!(format_srt_time(1.0004), "00:00:01,000");
        assert_eq!(format_srt_time(1.0006), "00:00:01,001");
        assert_eq!(format_srt_time(59.9999), "00:01:00,000");
    }

    #[test]
    fn test_to_srt_layout() {
        let srt = to_srt(&doc(&[("Hello world.", 0.0, 3.0), ("This is a test!", 3.0, 6.6)]));
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:03,000\nHello world.\n\n\
             2\n00:00:03,000 --> 00:00:06,600\nThis is a test!\n\n"
        );
    }

    #[test]
    fn test_parse_keeps_texts_and_millisecond_times() {
        let original = doc(&[("第一行\n第二行", 0.25, 1.5), ("next", 1.5, 3.0)]);
        let parsed = parse_srt(&to_srt(&original)).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_tolerates_bom_crlf_and_dot_separator() {
        let content = "\u{feff}1\r\n00:00:01.000 --> 00:00:02.500\r\nHi\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nthere\r\n";
        let parsed = parse_srt(content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.cues()[0].text(), "Hi");
        assert_eq!(parsed.cues()[0].end(), 2.5);
    }

    #[test]
    fn test_parse_normalizes_overlaps() {
        let content = "1\n00:00:00,000 --> 00:00:02,000\na\n\n\
                       2\n00:00:01,000 --> 00:00:03,000\nb\n\n\
                       3\n00:00:02,500 --> 00:00:02,800\nc\n";
        let parsed = parse_srt(content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.cues()[1].start(), 2.0);
        assert_eq!(parsed.cues()[1].text(), "b");
    }

    #[test]
    fn test_parse_reports_bad_timing_line() {
        let err = parse_srt("1\nnot a timing line\ntext\n").unwrap_err();
        assert!(matches!(err, VidsubError::SubtitleParse { line: 2, .. }));
    }

    #[tokio::test]
    async fn test_write_then_read_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let path = temp.child("nested/out.srt");

        let original = doc(&[("one", 0.0, 1.0)]);
        write_srt(&original, path.path()).await.unwrap();

        let written = std::fs::read_to_string(path.path()).unwrap();
        assert!(written.contains("00:00:00,000 --> 00:00:01,000"));
        assert_eq!(read_srt(path.path()).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = read_srt("/definitely/not/here.srt").await.unwrap_err();
        assert!(matches!(err, VidsubError::FileNotFound(_)));
    }
}
