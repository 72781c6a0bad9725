//! Provider catalog: display names, API key pages, continue method, and selectable models.
//!
//! Loaded from `config/providers.json` (embedded at compile time, validated by build.rs).

use std::sync::OnceLock;

use serde::Deserialize;

/// How a provider hands a conversation off to its web chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContinueMethod {
    /// Prompt is passed in the chat URL query string.
    Url,
    /// Chat page is opened and the prompt is copied to the clipboard.
    Clipboard,
}

/// A selectable model for a provider.
#[derive(Clone, Debug, Deserialize)]
pub struct ModelOption {
    pub value: String,
    pub label: String,
}

/// Catalog entry for one provider.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub api_key_url: String,
    pub continue_method: ContinueMethod,
    #[serde(default)]
    pub continue_info: Option<String>,
    pub models: Vec<ModelOption>,
}

impl ProviderInfo {
    /// First listed model; the options surface auto-selects it on provider change.
    pub fn recommended_model(&self) -> &str {
        self.models.first().map(|m| m.value.as_str()).unwrap_or("")
    }
}

fn load_providers() -> Vec<ProviderInfo> {
    let json = include_str!("../../config/providers.json");
    serde_json::from_str(json).expect("providers.json must be valid")
}

static PROVIDERS: OnceLock<Vec<ProviderInfo>> = OnceLock::new();

/// Returns all catalog providers in display order.
pub fn providers() -> &'static [ProviderInfo] {
    PROVIDERS.get_or_init(load_providers)
}

/// Look up a provider by id (case-sensitive, ids are lowercase).
pub fn find(id: &str) -> Option<&'static ProviderInfo> {
    providers().iter().find(|p| p.id == id)
}

/// Display name for a provider id, falling back to the id itself.
pub fn display_name(id: &str) -> &str {
    find(id).map(|p| p.name.as_str()).unwrap_or(id)
}
