// Baidu general translation API

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::common::{build_client, ensure_success, require};
use super::language::baidu_code;
use super::Translator;
use crate::config::BaiduConfig;
use crate::error::{Result, VidsubError};

const NAME: &str = "baidu";

/// Rejected because the caller's IP is not on the app's whitelist
const IP_WHITELIST_ERROR: &str = "58000";

/// Request timeout, system error and access frequency limit, reported with HTTP 200
const TRANSIENT_ERRORS: &[&str] = &["52001", "52002", "54003"];

#[derive(Debug, Deserialize)]
struct BaiduResponse {
    error_code: Option<Value>,
    error_msg: Option<String>,
    trans_result: Option<Vec<BaiduItem>>,
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct BaiduItem {
    dst: String,
}

pub struct BaiduTranslator {
    client: Client,
    config: BaiduConfig,
}

impl BaiduTranslator {
    pub fn new(config: BaiduConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            config,
        })
    }
}

/// Request signature: md5 of appid, query, salt and secret, lowercase hex
pub fn sign(app_id: &str, query: &str, salt: u32, secret: &str) -> String {
    format!("{:x}", md5::compute(format!("{}{}{}{}", app_id, query, salt, secret)))
}

fn random_salt() -> u32 {
    rand::thread_rng().gen_range(32768..=65536)
}

/// Error codes arrive as either strings or numbers
fn code_to_string(code: &Value) -> String {
    match code {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_response(body: &str) -> Result<String> {
    let response: BaiduResponse = serde_json::from_str(body)
        .map_err(|e| VidsubError::translation(NAME, format!("Unexpected response: {}", e)))?;

    if let Some(code) = &response.error_code {
        let code = code_to_string(code);
        let message = response.error_msg.unwrap_or_default();
        if code == IP_WHITELIST_ERROR {
            let client_ip = response
                .data
                .as_ref()
                .and_then(|d| d.get("client_ip"))
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            warn!(
                "Baidu rejected client IP {}; add it to the app's IP whitelist in the Baidu console",
                client_ip
            );
        }
        let message = format!("{} - {}", code, message);
        if TRANSIENT_ERRORS.contains(&code.as_str()) {
            return Err(VidsubError::transient(NAME, message));
        }
        return Err(VidsubError::translation(NAME, message));
    }

    match response.trans_result {
        Some(items) if !items.is_empty() => Ok(items
            .into_iter()
            .map(|item| item.dst)
            .collect::<Vec<_>>()
            .join("\n")),
        _ => Err(VidsubError::translation(NAME, "Response has no trans_result")),
    }
}

#[async_trait]
impl Translator for BaiduTranslator {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let app_id = require(NAME, "app_id", &self.config.app_id)?;
        let secret = require(NAME, "secret_key", &self.config.secret_key)?;

        let salt = random_salt();
        let signature = sign(app_id, text, salt, secret);
        let to = baidu_code(target_language);
        debug!("Baidu request: to={} salt={} chars={}", to, salt, text.chars().count());

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", text),
                ("from", "auto"),
                ("to", to.as_str()),
                ("appid", app_id),
                ("salt", salt.to_string().as_str()),
                ("sign", signature.as_str()),
            ])
            .send()
            .await?;

        let body = ensure_success(NAME, response).await?.text().await?;
        parse_response(&body)
    }

    async fn check_availability(&self) -> Result<String> {
        let app_id = require(NAME, "app_id", &self.config.app_id)?;
        require(NAME, "secret_key", &self.config.secret_key)?;
        Ok(format!("app {}", app_id))
    }
}
