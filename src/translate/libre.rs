// LibreTranslate

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::common::{build_client, ensure_success};
use super::language::normalize;
use super::Translator;
use crate::config::LibreConfig;
use crate::error::{Result, VidsubError};

const NAME: &str = "libre";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreResponse {
    translated_text: Option<String>,
    error: Option<String>,
}

pub struct LibreTranslator {
    client: Client,
    config: LibreConfig,
}

impl LibreTranslator {
    pub fn new(config: LibreConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            config,
        })
    }

    fn form(&self, text: &str, target_language: &str) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("q", text.to_string()),
            ("source", "auto".to_string()),
            ("target", normalize(target_language)),
            ("format", "text".to_string()),
        ];
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            form.push(("api_key", key.to_string()));
        }
        form
    }
}

fn parse_response(response: LibreResponse) -> Result<String> {
    match (response.translated_text, response.error) {
        (Some(text), _) => Ok(text),
        (None, Some(error)) => Err(VidsubError::translation(NAME, error)),
        (None, None) => Err(VidsubError::translation(NAME, "Response has no translatedText")),
    }
}

#[async_trait]
impl Translator for LibreTranslator {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let url = format!("{}/translate", self.config.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .form(&self.form(text, target_language))
            .send()
            .await?;

        let response: LibreResponse = ensure_success(NAME, response).await?.json().await?;
        parse_response(response)
    }

    /// The server answers `/languages` when it is up
    async fn check_availability(&self) -> Result<String> {
        let url = format!("{}/languages", self.config.endpoint.trim_end_matches('/'));
        let response = self.client.get(&url).send().await?;
        ensure_success(NAME, response).await?;
        Ok(self.config.endpoint.clone())
    }
}
