// OpenAI-compatible chat completions

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::common::{build_client, ensure_success, require};
use super::language::display_name;
use super::Translator;
use crate::config::OpenAiConfig;
use crate::error::{Result, VidsubError};

const NAME: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct OpenAiTranslator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiTranslator {
    pub fn new(config: OpenAiConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

fn system_prompt(target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the user's text into {}. \
         Preserve the meaning and style of the original. \
         Reply with the translation only.",
        display_name(target_language)
    )
}

fn parse_response(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| VidsubError::translation(NAME, "Empty completion"))
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let api_key = require(NAME, "api_key", &self.config.api_key)?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(target_language),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
        };

        debug!("Sending chat completion to {}", self.endpoint());
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let response: ChatResponse = ensure_success(NAME, response).await?.json().await?;
        parse_response(response)
    }

    async fn check_availability(&self) -> Result<String> {
        require(NAME, "api_key", &self.config.api_key)?;
        Ok(format!("model {}", self.config.model))
    }
}
