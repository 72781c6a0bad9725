//! Provider dispatch: route a prompt to the configured LLM API and return its answer.
//!
//! Each call is one-shot: no retries, no streaming, the HTTP client's default timeout.

mod anthropic;
mod error;
mod openai;
mod provider;

pub use anthropic::AnthropicProvider;
pub use error::{ExplainError, api_error};
pub use openai::OpenAiProvider;
pub use provider::{NO_EXPLANATION, Provider, ProviderRequest};

use crate::core::settings::Settings;

/// Registry of providers keyed by id, sharing one HTTP client.
pub struct Dispatcher {
    client: reqwest::Client,
    providers: Vec<Box<dyn Provider>>,
}

impl Dispatcher {
    /// Dispatcher with the built-in providers (OpenAI, Anthropic).
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_providers(
            client,
            vec![
                Box::new(OpenAiProvider::new()),
                Box::new(AnthropicProvider::new()),
            ],
        )
    }

    pub fn with_providers(client: reqwest::Client, providers: Vec<Box<dyn Provider>>) -> Self {
        Self { client, providers }
    }

    /// Add or replace the provider registered under the same id.
    pub fn register(&mut self, provider: Box<dyn Provider>) {
        self.providers.retain(|p| p.id() != provider.id());
        self.providers.push(provider);
    }

    pub fn provider(&self, id: &str) -> Option<&dyn Provider> {
        self.providers
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.as_ref())
    }

    /// Send `prompt` to `provider_id` using the key, model, and limits in `settings`.
    ///
    /// Fails before any network call when the provider is unknown or has no API key.
    pub async fn call_provider(
        &self,
        provider_id: &str,
        prompt: &str,
        settings: &Settings,
    ) -> Result<String, ExplainError> {
        let provider = self
            .provider(provider_id)
            .ok_or_else(|| ExplainError::UnsupportedProvider(provider_id.to_string()))?;

        if settings.api_key(provider_id).is_empty() {
            return Err(ExplainError::Configuration(format!(
                "No {} API key configured. Please configure your API key with `enhance config set`.",
                provider.display_name()
            )));
        }

        let request = provider.build_request(prompt, settings);
        log::info!(
            "API request: provider={} model={} prompt_len={} max_tokens={}",
            provider_id,
            request.body["model"].as_str().unwrap_or(""),
            prompt.len(),
            request.body["max_tokens"]
        );

        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder.json(&request.body).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::warn!("{} returned HTTP {}", provider_id, status.as_u16());
            return Err(api_error(status.as_u16(), &body));
        }

        provider
            .parse_response(&body)
            .map_err(|source| ExplainError::Decode {
                provider: provider.display_name().to_string(),
                source,
            })
    }
}
