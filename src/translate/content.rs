// Translating free text and subtitle documents through a Translator

use tracing::{debug, info};

use super::Translator;
use crate::error::Result;
use crate::subtitle::{Document, Segmenter};

/// Group sentences into paragraphs of at most `limit` characters.
///
/// Sentences are split with the subtitle punctuation rules and joined by a
/// single space. A sentence longer than `limit` becomes its own paragraph.
pub fn pack_paragraphs(text: &str, limit: usize) -> Result<Vec<String>> {
    let limit = limit.max(1);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in Segmenter::unbounded().segments(text)? {
        let len = sentence.chars().count();
        if !current.is_empty() && current_len + 1 + len > limit {
            paragraphs.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(sentence);
        current_len += len;
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs)
}

/// Translate a transcript paragraph by paragraph, one result per line
pub async fn translate_text_content(
    translator: &dyn Translator,
    text: &str,
    target_language: &str,
    paragraph_limit: usize,
) -> Result<String> {
    let paragraphs = pack_paragraphs(text, paragraph_limit)?;
    info!(
        "Translating {} paragraph(s) to {} with {}",
        paragraphs.len(),
        target_language,
        translator.name()
    );

    let mut translated = Vec::with_capacity(paragraphs.len());
    for (i, paragraph) in paragraphs.iter().enumerate() {
        debug!("┌─ Paragraph {}/{}", i + 1, paragraphs.len());
        debug!("│ Source: {}", paragraph);
        let result = translator.translate(paragraph, target_language).await?;
        debug!("└─ Result: {}", result);
        translated.push(result);
    }

    Ok(translated.join("\n"))
}

/// Translate every cue independently, keeping the original timing
pub async fn translate_document(
    translator: &dyn Translator,
    document: &Document,
    target_language: &str,
) -> Result<Document> {
    info!(
        "Translating {} subtitle cue(s) to {} with {}",
        document.len(),
        target_language,
        translator.name()
    );

    let mut texts = Vec::with_capacity(document.len());
    for (i, cue) in document.iter().enumerate() {
        debug!("┌─ Cue {}/{}: {}", i + 1, document.len(), cue.text());
        let result = translator.translate(cue.text(), target_language).await?;
        debug!("└─ {}", result);
        texts.push(result);
    }

    document.with_texts(texts)
}
