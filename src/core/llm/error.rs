//! Explanation and provider API error types.

use serde::Deserialize;

/// Errors from a single explanation request.
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    /// Settings are incomplete (e.g. no API key for the selected provider).
    #[error("{0}")]
    Configuration(String),
    /// The provider answered with a non-2xx status.
    #[error("{message}")]
    Api { message: String, status: u16 },
    #[error("Unsupported API provider: {0}")]
    UnsupportedProvider(String),
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid response from {provider}: {source}")]
    Decode {
        provider: String,
        source: serde_json::Error,
    },
}

/// Provider error envelope: `{"error": {"message": "..."}}` (OpenAI and Anthropic share it).
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Map a non-2xx response into [`ExplainError::Api`], preferring the provider's message.
pub fn api_error(status: u16, body: &str) -> ExplainError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("API request failed: {}", status));
    ExplainError::Api { message, status }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_uses_envelope_message() {
        let err = api_error(401, r#"{"error":{"message":"invalid key"}}"#);
        match &err {
            ExplainError::Api { message, status } => {
                assert_eq!(message, "invalid key");
                assert_eq!(*status, 401);
            }
            _ => panic!("expected Api, got {:?}", err),
        }
        assert_eq!(err.to_string(), "invalid key");
    }

    #[test]
    fn api_error_anthropic_envelope() {
        let body = r#"{"type":"error","error":{"type":"rate_limit_error","message":"Rate limit exceeded"}}"#;
        assert_eq!(api_error(429, body).to_string(), "Rate limit exceeded");
    }

    #[test]
    fn api_error_generic_for_unparseable_body() {
        let err = api_error(502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "API request failed: 502");
    }

    #[test]
    fn api_error_generic_when_message_missing() {
        assert_eq!(
            api_error(500, r#"{"error":{}}"#).to_string(),
            "API request failed: 500"
        );
        assert_eq!(api_error(500, "{}").to_string(), "API request failed: 500");
    }

    #[test]
    fn configuration_error_displays_verbatim() {
        let err = ExplainError::Configuration("No OpenAI API key configured.".into());
        assert_eq!(err.to_string(), "No OpenAI API key configured.");
    }
}
