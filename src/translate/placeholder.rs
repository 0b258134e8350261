use async_trait::async_trait;

use super::language::placeholder_label;
use super::Translator;
use crate::error::Result;

/// Last-resort backend: labels the source text instead of translating it
#[derive(Debug, Default)]
pub struct PlaceholderTranslator;

#[async_trait]
impl Translator for PlaceholderTranslator {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        Ok(format!("{} {}", placeholder_label(target_language), text))
    }

    async fn check_availability(&self) -> Result<String> {
        Ok("labels text only".to_string())
    }
}
