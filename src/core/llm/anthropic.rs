//! Anthropic Messages provider.

use serde::Deserialize;
use serde_json::json;

use super::provider::{
    NO_EXPLANATION, Provider, ProviderRequest, max_tokens_or_default, model_or_default,
};
use crate::core::settings::Settings;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    endpoint: String,
}

impl AnthropicProvider {
    pub fn new() -> Self {
        Self::with_endpoint(ANTHROPIC_API_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl Provider for AnthropicProvider {
    fn id(&self) -> &'static str {
        "anthropic"
    }

    fn default_model(&self) -> &'static str {
        ANTHROPIC_DEFAULT_MODEL
    }

    fn build_request(&self, prompt: &str, settings: &Settings) -> ProviderRequest {
        let body = json!({
            "model": model_or_default(settings, self.default_model()),
            "max_tokens": max_tokens_or_default(settings),
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });
        ProviderRequest {
            url: self.endpoint.clone(),
            headers: vec![
                (
                    "x-api-key".to_string(),
                    settings.api_key(self.id()).to_string(),
                ),
                (
                    "anthropic-version".to_string(),
                    ANTHROPIC_VERSION.to_string(),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        }
    }

    fn parse_response(&self, body: &str) -> Result<String, serde_json::Error> {
        let response: MessagesResponse = serde_json::from_str(body)?;
        Ok(response
            .content
            .into_iter()
            .next()
            .and_then(|b| b.text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_EXPLANATION.to_string()))
    }
}
