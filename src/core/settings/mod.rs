//! User settings: provider choice, per-provider API keys, model and limits, trigger key.
//!
//! Persisted as a JSON record under a well-known key of the settings store (see [`store`]).
//! Stored records are merged over [`Settings::default`] field by field.

pub mod store;

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::core::catalog;

pub use store::{KeyLookup, SETTINGS_KEY, SettingsStore, StoredSettings, TEST_SETTINGS_KEY};

/// Allowed range for `maxTokens`.
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 50..=500;

/// Allowed range for `maxContextLength`.
pub const MAX_CONTEXT_LENGTH_RANGE: RangeInclusive<usize> = 200..=10_000;

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 1000;

/// Errors when loading, validating, or storing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("Failed to access settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

/// Modifier key that must be held at mouse-down for a selection to trigger an explanation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKey {
    Ctrl,
    #[default]
    Alt,
    Shift,
    Meta,
}

impl std::fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TriggerKey::Ctrl => "ctrl",
            TriggerKey::Alt => "alt",
            TriggerKey::Shift => "shift",
            TriggerKey::Meta => "meta",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub provider: String,
    pub api_key_by_provider: BTreeMap<String, String>,
    pub model: String,
    pub max_tokens: u32,
    pub max_context_length: usize,
    pub trigger_key: TriggerKey,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key_by_provider: BTreeMap::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_context_length: DEFAULT_MAX_CONTEXT_LENGTH,
            trigger_key: TriggerKey::default(),
        }
    }
}

impl Settings {
    /// API key stored for `provider`, or "" when none is configured.
    pub fn api_key(&self, provider: &str) -> &str {
        self.api_key_by_provider
            .get(provider)
            .map(|k| k.trim())
            .unwrap_or("")
    }

    /// API key of the selected provider.
    pub fn selected_api_key(&self) -> &str {
        self.api_key(&self.provider)
    }

    /// Store a trimmed key for `provider`. An empty key removes the entry.
    pub fn set_api_key(&mut self, provider: &str, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            self.api_key_by_provider.remove(provider);
        } else {
            self.api_key_by_provider
                .insert(provider.to_string(), key.to_string());
        }
    }

    /// Fill empty keys from `lookup`, called with `<PROVIDER>_API_KEY` variable names
    /// (e.g. `OPENAI_API_KEY`; see [`env_key`]).
    pub fn fill_keys_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for info in catalog::providers() {
            if !self.api_key(&info.id).is_empty() {
                continue;
            }
            let var = format!("{}_API_KEY", info.id.to_uppercase());
            if let Some(key) = lookup(&var)
                && !key.trim().is_empty()
            {
                log::debug!("Using {} from environment", var);
                self.set_api_key(&info.id, &key);
            }
        }
    }

    /// Check the record the way the options surface does before saving.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let Some(info) = catalog::find(&self.provider) else {
            return Err(SettingsError::Invalid(format!(
                "Unknown API provider '{}'",
                self.provider
            )));
        };
        if self.selected_api_key().is_empty() {
            return Err(SettingsError::Invalid(format!(
                "Please enter your {} API key",
                info.name
            )));
        }
        if self.model.trim().is_empty() {
            return Err(SettingsError::Invalid("Please select a model".to_string()));
        }
        if !MAX_TOKENS_RANGE.contains(&self.max_tokens) {
            return Err(SettingsError::Invalid(
                "Max tokens must be between 50 and 500".to_string(),
            ));
        }
        if !MAX_CONTEXT_LENGTH_RANGE.contains(&self.max_context_length) {
            return Err(SettingsError::Invalid(
                "Max request length must be between 200 and 10,000".to_string(),
            ));
        }
        Ok(())
    }

    /// Switch provider; picks the provider's recommended model unless `model` is given.
    pub fn select_provider(&mut self, provider: &str, model: Option<&str>) {
        let changed = self.provider != provider;
        self.provider = provider.to_string();
        match model {
            Some(m) => self.model = m.trim().to_string(),
            None if changed => {
                if let Some(info) = catalog::find(provider) {
                    self.model = info.recommended_model().to_string();
                }
            }
            None => {}
        }
    }
}

/// Reads an API key variable from the process environment.
pub fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Field overrides from the options surface. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsChanges {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub max_context_length: Option<usize>,
    pub trigger_key: Option<TriggerKey>,
    /// (provider id, key) pairs.
    pub api_keys: Vec<(String, String)>,
}

impl SettingsChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when applying these changes replaces the stored `field` (a camelCase record path
    /// such as `maxTokens` or `apiKeyByProvider.openai`).
    pub fn covers(&self, field: &str) -> bool {
        match field.split_once('.') {
            Some(("apiKeyByProvider", provider)) => {
                self.api_keys.iter().any(|(p, _)| p == provider)
            }
            Some(_) => false,
            None => match field {
                "provider" => self.provider.is_some(),
                "model" => self.model.is_some(),
                "maxTokens" => self.max_tokens.is_some(),
                "maxContextLength" => self.max_context_length.is_some(),
                "triggerKey" => self.trigger_key.is_some(),
                _ => false,
            },
        }
    }

    pub fn apply(&self, settings: &mut Settings) {
        match &self.provider {
            Some(provider) => settings.select_provider(provider, self.model.as_deref()),
            None => {
                if let Some(model) = &self.model {
                    settings.model = model.trim().to_string();
                }
            }
        }
        if let Some(n) = self.max_tokens {
            settings.max_tokens = n;
        }
        if let Some(n) = self.max_context_length {
            settings.max_context_length = n;
        }
        if let Some(key) = self.trigger_key {
            settings.trigger_key = key;
        }
        for (provider, key) in &self.api_keys {
            settings.set_api_key(provider, key);
        }
    }
}

#[cfg(test)]
mod tests;
