// Local LLM translation through Ollama's generate API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::common::{build_client, ensure_success};
use super::language::display_name;
use super::Translator;
use crate::config::OllamaConfig;
use crate::error::{Result, VidsubError};

const NAME: &str = "ollama";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TranslationResult {
    text: String,
}

pub struct OllamaTranslator {
    client: Client,
    config: OllamaConfig,
}

impl OllamaTranslator {
    pub fn new(config: OllamaConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            config,
        })
    }
}

fn build_prompt(text: &str, target_language: &str) -> String {
    let language_name = display_name(target_language);
    format!(
        "You are a professional translator.\n\
         \n\
         CRITICAL: You must translate the text to {} ONLY. Do not translate to any other language.\n\
         The target language is: {} (language code: {})\n\
         \n\
         Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
         Do not include any explanations, alternatives, or text in other languages.\n\
         \n\
         [Text to translate]\n\
         {}\n",
        language_name, language_name, target_language, language_name, text
    )
}

/// Pull the translation out of a model reply that ignored the JSON format
pub fn clean_translation_response(response: &str) -> String {
    let lines: Vec<&str> = response.lines().collect();

    for &line in &lines {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("Here are")
            || trimmed.starts_with("Here is")
            || trimmed.starts_with("Option")
            || trimmed.starts_with("**Option")
            || trimmed.starts_with("Translation:")
            || trimmed.starts_with("- ")
            || trimmed.starts_with("* ")
        {
            continue;
        }

        if trimmed.starts_with("**") && trimmed.ends_with("**") {
            continue;
        }

        if trimmed.chars().count() > 3 {
            return trimmed.to_string();
        }
    }

    lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .unwrap_or(response)
        .to_string()
}

fn extract_translation(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(VidsubError::translation(NAME, "Empty translation received"));
    }
    if let Ok(result) = serde_json::from_str::<TranslationResult>(raw) {
        return Ok(result.text.trim().to_string());
    }
    Ok(clean_translation_response(raw))
}

#[async_trait]
impl Translator for OllamaTranslator {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(text, target_language),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        debug!("Sending translation request to: {}", url);

        let response = self.client.post(&url).json(&request).send().await?;
        let response: GenerateResponse = ensure_success(NAME, response).await?.json().await?;

        debug!("Raw Ollama response: {}", response.response);
        extract_translation(&response.response)
    }

    /// Check that Ollama is reachable and the model has been pulled
    async fn check_availability(&self) -> Result<String> {
        let url = format!("{}/api/show", self.config.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "name": self.config.model }))
            .send()
            .await?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.config.model);
            Ok(format!("model {}", self.config.model))
        } else {
            Err(VidsubError::translation(
                NAME,
                format!(
                    "model '{}' not found. Pull it first: ollama pull {}",
                    self.config.model, self.config.model
                ),
            ))
        }
    }
}
