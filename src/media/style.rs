//! Styling and path quoting for ffmpeg's `subtitles` filter.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, VidsubError};

/// Appearance of burned-in subtitles, rendered as the filter's `force_style` option.
///
/// Colours are written as `#RRGGBB` or `#AARRGGBB`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleStyle {
    pub font_name: Option<String>,
    pub font_size: Option<u32>,
    pub primary_colour: Option<String>,
    pub outline_colour: Option<String>,
    pub back_colour: Option<String>,
    pub bold: Option<bool>,
    pub outline: Option<f32>,
    pub shadow: Option<f32>,
    /// Numpad-style position, 2 is bottom centre
    pub alignment: Option<u8>,
    pub margin_v: Option<u32>,
}

impl SubtitleStyle {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// `Key=Value` pairs joined by commas, in a fixed order
    pub fn to_force_style(&self) -> Result<String> {
        let mut parts: Vec<String> = Vec::new();

        if let Some(font) = &self.font_name {
            parts.push(format!("FontName={}", font));
        }
        if let Some(size) = self.font_size {
            parts.push(format!("FontSize={}", size));
        }
        if let Some(colour) = &self.primary_colour {
            parts.push(format!("PrimaryColour={}", parse_colour(colour)?));
        }
        if let Some(colour) = &self.outline_colour {
            parts.push(format!("OutlineColour={}", parse_colour(colour)?));
        }
        if let Some(colour) = &self.back_colour {
            parts.push(format!("BackColour={}", parse_colour(colour)?));
        }
        if let Some(bold) = self.bold {
            // ASS uses -1 for true
            parts.push(format!("Bold={}", if bold { -1 } else { 0 }));
        }
        if let Some(outline) = self.outline {
            parts.push(format!("Outline={}", outline));
        }
        if let Some(shadow) = self.shadow {
            parts.push(format!("Shadow={}", shadow));
        }
        if let Some(alignment) = self.alignment {
            parts.push(format!("Alignment={}", alignment));
        }
        if let Some(margin) = self.margin_v {
            parts.push(format!("MarginV={}", margin));
        }

        Ok(parts.join(","))
    }

    /// Full `subtitles=...` filter expression for `subtitle_path`
    pub fn filter_for(&self, subtitle_path: &Path) -> Result<String> {
        let mut filter = format!("subtitles='{}'", escape_filter_path(subtitle_path));
        let style = self.to_force_style()?;
        if !style.is_empty() {
            filter.push_str(&format!(":force_style='{}'", style));
        }
        Ok(filter)
    }
}

/// Convert `#RRGGBB` / `#AARRGGBB` into ASS `&HAABBGGRR`
pub fn parse_colour(colour: &str) -> Result<String> {
    let hex = colour.trim().trim_start_matches('#');
    let invalid = || VidsubError::Config(format!("Invalid colour '{}', expected #RRGGBB or #AARRGGBB", colour));

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let (alpha, rgb) = match hex.len() {
        6 => ("00", hex),
        8 => hex.split_at(2),
        _ => return Err(invalid()),
    };
    let (r, gb) = rgb.split_at(2);
    let (g, b) = gb.split_at(2);

    Ok(format!("&H{}{}{}{}", alpha, b, g, r).to_uppercase())
}

/// Quote a path for use inside a single-quoted filter argument
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_style() {
        let style = SubtitleStyle::default();
        assert!(style.is_empty());
        assert_eq!(style.to_force_style().unwrap(), "");
        assert_eq!(
            style.filter_for(Path::new("/tmp/subs.srt")).unwrap(),
            "subtitles='/tmp/subs.srt'"
        );
    }

    #[test]
    fn test_force_style_order() {
        let style = SubtitleStyle {
            margin_v: Some(30),
            font_name: Some("Noto Sans CJK SC".to_string()),
            font_size: Some(24),
            primary_colour: Some("#FFFFFF".to_string()),
            bold: Some(true),
            outline: Some(1.5),
            ..Default::default()
        };
        assert_eq!(
            style.to_force_style().unwrap(),
            "FontName=Noto Sans CJK SC,FontSize=24,PrimaryColour=&H00FFFFFF,Bold=-1,Outline=1.5,MarginV=30"
        );
    }

    #[test]
    fn test_colour_conversion() {
        assert_eq!(parse_colour("#FF8800").unwrap(), "&H000088FF");
        assert_eq!(parse_colour("#80ff0000").unwrap(), "&H800000FF");
        assert!(parse_colour("#FFF").is_err());
        assert!(parse_colour("#GG0000").is_err());
    }

    #[test]
    fn test_escape_windows_path() {
        assert_eq!(
            escape_filter_path(Path::new(r"C:\Temp\video\output\translated_subtitles.srt")),
            r"C\:/Temp/video/output/translated_subtitles.srt"
        );
        assert_eq!(escape_filter_path(Path::new("/tmp/it's.srt")), r"/tmp/it\'s.srt");
    }

    #[test]
    fn test_filter_with_style() {
        let style = SubtitleStyle {
            font_size: Some(20),
            alignment: Some(2),
            ..Default::default()
        };
        assert_eq!(
            style.filter_for(Path::new("out/subs.srt")).unwrap(),
            "subtitles='out/subs.srt':force_style='FontSize=20,Alignment=2'"
        );
    }
}
