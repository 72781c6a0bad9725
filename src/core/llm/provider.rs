//! Provider capability: how one LLM API shapes requests and where it puts the answer.

use crate::core::catalog;
use crate::core::settings::Settings;

/// Returned when a successful response carries no text.
pub const NO_EXPLANATION: &str = "No explanation received";

/// A ready-to-send HTTP request: POST `url` with `headers` and JSON `body`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl ProviderRequest {
    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// One LLM API. Implementations are registered with the dispatcher by [`Provider::id`].
pub trait Provider: Send + Sync {
    /// Settings/catalog id, e.g. "openai".
    fn id(&self) -> &'static str;

    fn display_name(&self) -> &'static str {
        catalog::display_name(self.id())
    }

    /// Model used when settings leave it empty.
    fn default_model(&self) -> &'static str;

    /// Build the request for `prompt` with the key, model, and token limit from `settings`.
    fn build_request(&self, prompt: &str, settings: &Settings) -> ProviderRequest;

    /// Extract the explanation text from a 2xx response body.
    fn parse_response(&self, body: &str) -> Result<String, serde_json::Error>;
}

/// Model from settings, or the provider default when empty.
pub(super) fn model_or_default<'a>(settings: &'a Settings, default: &'a str) -> &'a str {
    let model = settings.model.trim();
    if model.is_empty() { default } else { model }
}

/// Token limit from settings, 500 when unset.
pub(super) fn max_tokens_or_default(settings: &Settings) -> u32 {
    if settings.max_tokens == 0 {
        500
    } else {
        settings.max_tokens
    }
}
