// Machine translation backends behind a fallback chain
//
// Each backend implements `Translator`; `TranslationChain` tries them in the
// configured order:
// - baidu: Baidu general translation API (signed requests)
// - deepl: DeepL REST API
// - openai: OpenAI-compatible chat completions
// - libre: LibreTranslate
// - ollama: local LLM through Ollama
// - placeholder: labels the text, never fails

pub mod baidu;
pub mod common;
pub mod content;
pub mod deepl;
pub mod language;
pub mod libre;
pub mod ollama;
pub mod openai;
pub mod placeholder;

use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

pub use content::{pack_paragraphs, translate_document, translate_text_content};

use crate::config::TranslateConfig;
use crate::error::{Result, VidsubError};

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Backend name used in logs and configuration
    fn name(&self) -> &'static str;

    /// Translate `text` into `target_language` (ISO 639-1 code)
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;

    /// Whether the backend can be used, without translating anything
    async fn check_availability(&self) -> Result<String>;

    /// Availability of each backend behind this translator
    async fn check_backends(&self) -> Vec<(&'static str, Result<String>)> {
        vec![(self.name(), self.check_availability().await)]
    }
}

/// Ordered list of backends with per-backend retries for transient failures
pub struct TranslationChain {
    backends: Vec<Box<dyn Translator>>,
    max_retries: u32,
    retry_delay: Duration,
}

impl TranslationChain {
    pub fn new(backends: Vec<Box<dyn Translator>>, max_retries: u32) -> Self {
        Self {
            backends,
            max_retries,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Base delay between retries; attempt `n` waits `n * delay`
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    async fn try_backend(&self, backend: &dyn Translator, text: &str, target_language: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match backend.translate(text, target_language).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} failed ({}), retry {}/{}",
                        backend.name(),
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Translator for TranslationChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let mut failures = Vec::new();
        for backend in &self.backends {
            match self.try_backend(backend.as_ref(), text, target_language).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    warn!("Translation backend {} failed: {}", backend.name(), e);
                    failures.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        Err(VidsubError::AllBackendsFailed {
            kind: "translation".to_string(),
            failures,
        })
    }

    async fn check_availability(&self) -> Result<String> {
        let mut failures = Vec::new();
        for (name, result) in self.check_backends().await {
            match result {
                Ok(_) => return Ok(format!("{} available", name)),
                Err(e) => failures.push(format!("{}: {}", name, e)),
            }
        }
        Err(VidsubError::AllBackendsFailed {
            kind: "translation".to_string(),
            failures,
        })
    }

    async fn check_backends(&self) -> Vec<(&'static str, Result<String>)> {
        let mut results = Vec::new();
        for backend in &self.backends {
            results.push((backend.name(), backend.check_availability().await));
        }
        results
    }
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a single backend by its configuration name
    pub fn create_translator(name: &str, config: &TranslateConfig) -> Result<Box<dyn Translator>> {
        let timeout = config.timeout_secs;
        let translator: Box<dyn Translator> = match name {
            "baidu" => Box::new(baidu::BaiduTranslator::new(config.baidu.clone(), timeout)?),
            "deepl" => Box::new(deepl::DeeplTranslator::new(config.deepl.clone(), timeout)?),
            "openai" => Box::new(openai::OpenAiTranslator::new(config.openai.clone(), timeout)?),
            "libre" => Box::new(libre::LibreTranslator::new(config.libre.clone(), timeout)?),
            "ollama" => Box::new(ollama::OllamaTranslator::new(config.ollama.clone(), timeout)?),
            "placeholder" => Box::new(placeholder::PlaceholderTranslator),
            other => {
                return Err(VidsubError::Config(format!(
                    "Unknown translation backend '{}'",
                    other
                )))
            }
        };
        Ok(translator)
    }

    /// Create the configured fallback chain
    pub fn create_chain(config: &TranslateConfig) -> Result<TranslationChain> {
        let backends = config
            .backends
            .iter()
            .map(|name| Self::create_translator(name, config))
            .collect::<Result<Vec<_>>>()?;
        let chain = TranslationChain::new(backends, config.max_retries);
        info!("Translation backends: {}", chain.backend_names().join(" -> "));
        Ok(chain)
    }
}
