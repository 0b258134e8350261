//! Language codes and their per-backend spellings.

/// Target languages offered by default, as (code, English name)
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("zh", "Chinese"),
    ("en", "English"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("fr", "French"),
    ("de", "German"),
    ("es", "Spanish"),
];

/// Lower-case, trimmed form of a language code
pub fn normalize(code: &str) -> String {
    code.trim().to_lowercase()
}

/// English name of a language, falling back to the code itself
pub fn display_name(code: &str) -> String {
    let code = normalize(code);
    match code.as_str() {
        "zh" | "zh-cn" => "Chinese".to_string(),
        "zh-tw" => "Traditional Chinese".to_string(),
        "en" => "English".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "es" => "Spanish".to_string(),
        "ru" => "Russian".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "vi" => "Vietnamese".to_string(),
        "th" => "Thai".to_string(),
        "ar" => "Arabic".to_string(),
        _ => code,
    }
}

/// Baidu uses its own codes for some languages
pub fn baidu_code(code: &str) -> String {
    let code = normalize(code);
    match code.as_str() {
        "ja" => "jp".to_string(),
        "ko" => "kor".to_string(),
        "fr" => "fra".to_string(),
        "es" => "spa".to_string(),
        _ => code,
    }
}

/// DeepL wants upper-case codes and a regional variant for English
pub fn deepl_code(code: &str) -> String {
    let code = normalize(code);
    match code.as_str() {
        "en" => "EN-US".to_string(),
        _ => code.to_uppercase(),
    }
}

/// Prefix marking text that was not actually translated
pub fn placeholder_label(code: &str) -> String {
    let code = normalize(code);
    match code.as_str() {
        "en" => "[English Translation]".to_string(),
        "ja" => "[日本語翻訳]".to_string(),
        "ko" => "[한국어 번역]".to_string(),
        "fr" => "[Traduction française]".to_string(),
        "de" => "[Deutsche Übersetzung]".to_string(),
        "es" => "[Traducción española]".to_string(),
        _ => format!("[{}]", code),
    }
}
