//! Inbound message contract: `{action, data}` requests answered with `{success, explanation?, error?}`.
//!
//! `explainText` uses the saved settings; `testAPI` uses the transient `testSettings` record
//! written by the connection test. Every failure becomes a `success: false` reply.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::llm::{Dispatcher, ExplainError};
use crate::core::page::PageContext;
use crate::core::prompt;
use crate::core::settings::{SETTINGS_KEY, Settings, SettingsStore, TEST_SETTINGS_KEY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data")]
pub enum Request {
    #[serde(rename = "explainText")]
    ExplainText(PageContext),
    #[serde(rename = "testAPI")]
    TestApi(PageContext),
}

impl Request {
    fn settings_key(&self) -> &'static str {
        match self {
            Request::ExplainText(_) => SETTINGS_KEY,
            Request::TestApi(_) => TEST_SETTINGS_KEY,
        }
    }

    fn data(&self) -> &PageContext {
        match self {
            Request::ExplainText(d) | Request::TestApi(d) => d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn explanation(text: String) -> Self {
        Self {
            success: true,
            explanation: Some(text),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            explanation: None,
            error: Some(message.into()),
        }
    }
}

/// Answers requests using settings read fresh from the store for every message.
pub struct MessageHandler {
    store: SettingsStore,
    dispatcher: Dispatcher,
}

impl MessageHandler {
    pub fn new(store: SettingsStore, dispatcher: Dispatcher) -> Self {
        Self { store, dispatcher }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub async fn handle(&self, request: &Request) -> Response {
        let request_id = Uuid::new_v4();
        let key = request.settings_key();
        let data = request.data();
        log::debug!(
            "[{}] {} request: selected_len={} context_len={}",
            request_id,
            key,
            data.selected_text.len(),
            data.context_text.len()
        );

        let settings = match self.store.get(key) {
            Ok(s) => s,
            Err(e) => {
                log::error!("[{}] Failed to read {}: {}", request_id, key, e);
                return Response::error(e.to_string());
            }
        };

        match self.explain(data, &settings).await {
            Ok(text) => {
                log::info!("[{}] Explanation received ({} chars)", request_id, text.len());
                Response::explanation(text)
            }
            Err(e) => {
                log::error!("[{}] Explanation failed: {}", request_id, e);
                Response::error(e.to_string())
            }
        }
    }

    /// Parse a raw JSON message and answer it. Malformed messages get an error reply.
    pub async fn handle_json(&self, raw: &[u8]) -> Response {
        match serde_json::from_slice::<Request>(raw) {
            Ok(request) => self.handle(&request).await,
            Err(e) => {
                log::warn!("Rejected malformed message: {}", e);
                Response::error(format!("Invalid message: {}", e))
            }
        }
    }

    /// Build the explain prompt for `ctx` and send it to the selected provider.
    pub async fn explain(
        &self,
        ctx: &PageContext,
        settings: &Settings,
    ) -> Result<String, ExplainError> {
        let prompt = prompt::build_explain_prompt(ctx);
        self.dispatcher
            .call_provider(&settings.provider, &prompt, settings)
            .await
    }
}
