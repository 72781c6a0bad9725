//! OpenAI Chat Completions provider.

use serde::Deserialize;
use serde_json::json;

use super::provider::{
    NO_EXPLANATION, Provider, ProviderRequest, max_tokens_or_default, model_or_default,
};
use crate::core::settings::Settings;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new() -> Self {
        Self::with_endpoint(OPENAI_API_URL)
    }

    /// Provider posting to a custom endpoint (proxies, tests).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl Provider for OpenAiProvider {
    fn id(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &'static str {
        OPENAI_DEFAULT_MODEL
    }

    fn build_request(&self, prompt: &str, settings: &Settings) -> ProviderRequest {
        let body = json!({
            "model": model_or_default(settings, self.default_model()),
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "max_tokens": max_tokens_or_default(settings),
            "temperature": TEMPERATURE,
        });
        ProviderRequest {
            url: self.endpoint.clone(),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", settings.api_key(self.id())),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        }
    }

    fn parse_response(&self, body: &str) -> Result<String, serde_json::Error> {
        let response: ChatResponse = serde_json::from_str(body)?;
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_EXPLANATION.to_string()))
    }
}
