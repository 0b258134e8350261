// DeepL REST API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::common::{build_client, ensure_success, require};
use super::language::deepl_code;
use super::Translator;
use crate::config::DeeplConfig;
use crate::error::{Result, VidsubError};

const NAME: &str = "deepl";

#[derive(Debug, Serialize)]
struct DeeplRequest<'a> {
    text: Vec<&'a str>,
    source_lang: &'a str,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

pub struct DeeplTranslator {
    client: Client,
    config: DeeplConfig,
}

impl DeeplTranslator {
    pub fn new(config: DeeplConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            config,
        })
    }
}

fn parse_response(response: DeeplResponse) -> Result<String> {
    response
        .translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or_else(|| VidsubError::translation(NAME, "Response has no translations"))
}

#[async_trait]
impl Translator for DeeplTranslator {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let api_key = require(NAME, "api_key", &self.config.api_key)?;

        let request = DeeplRequest {
            text: vec![text],
            source_lang: &self.config.source_lang,
            target_lang: deepl_code(target_language),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", api_key))
            .json(&request)
            .send()
            .await?;

        let response: DeeplResponse = ensure_success(NAME, response).await?.json().await?;
        parse_response(response)
    }

    async fn check_availability(&self) -> Result<String> {
        require(NAME, "api_key", &self.config.api_key)?;
        Ok(format!("source {}", self.config.source_lang))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let request = DeeplRequest {
            text: vec!["你好"],
            source_lang: "ZH",
            target_lang: deepl_code("en"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"text": ["你好"], "source_lang": "ZH", "target_lang": "EN-US"})
        );
    }

    #[test]
    fn test_parse_first_translation() {
        let response: DeeplResponse = serde_json::from_str(
            r#"{"translations":[{"detected_source_language":"ZH","text":"Hello"}]}"#,
        )
        .unwrap();
        assert_eq!(parse_response(response).unwrap(), "Hello");

        let empty: DeeplResponse = serde_json::from_str(r#"{"translations":[]}"#).unwrap();
        assert!(parse_response(empty).is_err());
    }

    #[tokio::test]
    async fn test_availability_needs_key() {
        let translator = DeeplTranslator::new(DeeplConfig::default(), 5).unwrap();
        assert!(matches!(
            translator.check_availability().await,
            Err(VidsubError::MissingCredentials { .. })
        ));
    }
}
