//! Settings module tests.

use serde_json::json;

use super::*;

fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
    SettingsStore::at(dir.path().join("storage.json"))
}

fn valid_settings() -> Settings {
    let mut s = Settings::default();
    s.set_api_key("openai", "sk-test");
    s
}

#[test]
fn defaults_match_first_run_values() {
    let s = Settings::default();
    assert_eq!(s.provider, "openai");
    assert_eq!(s.model, "gpt-3.5-turbo");
    assert_eq!(s.max_tokens, 150);
    assert_eq!(s.max_context_length, 1000);
    assert_eq!(s.trigger_key, TriggerKey::Alt);
    assert!(s.api_key_by_provider.is_empty());
}

#[test]
fn partial_record_is_merged_over_defaults() {
    let s: Settings = serde_json::from_value(json!({
        "provider": "anthropic",
        "apiKeyByProvider": { "anthropic": "sk-ant" }
    }))
    .unwrap();
    assert_eq!(s.provider, "anthropic");
    assert_eq!(s.selected_api_key(), "sk-ant");
    assert_eq!(s.max_tokens, 150);
    assert_eq!(s.trigger_key, TriggerKey::Alt);
}

#[test]
fn serializes_camel_case_fields() {
    let v = serde_json::to_value(valid_settings()).unwrap();
    assert_eq!(v["maxContextLength"], 1000);
    assert_eq!(v["triggerKey"], "alt");
    assert_eq!(v["apiKeyByProvider"]["openai"], "sk-test");
}

#[test]
fn set_api_key_trims_and_empty_removes() {
    let mut s = Settings::default();
    s.set_api_key("openai", "  sk-1  ");
    assert_eq!(s.api_key("openai"), "sk-1");
    s.set_api_key("openai", "   ");
    assert_eq!(s.api_key("openai"), "");
    assert!(!s.api_key_by_provider.contains_key("openai"));
}

#[test]
fn validate_accepts_complete_settings() {
    assert!(valid_settings().validate().is_ok());
}

#[test]
fn validate_requires_key_for_selected_provider() {
    let mut s = valid_settings();
    s.provider = "anthropic".to_string();
    let err = s.validate().unwrap_err();
    assert_eq!(err.to_string(), "Please enter your Anthropic API key");
}

#[test]
fn validate_rejects_unknown_provider() {
    let mut s = valid_settings();
    s.provider = "gemini".to_string();
    assert!(s.validate().unwrap_err().to_string().contains("gemini"));
}

#[test]
fn validate_rejects_out_of_range_limits() {
    let mut s = valid_settings();
    s.max_tokens = 49;
    assert_eq!(
        s.validate().unwrap_err().to_string(),
        "Max tokens must be between 50 and 500"
    );
    s.max_tokens = 500;
    s.max_context_length = 10_001;
    assert_eq!(
        s.validate().unwrap_err().to_string(),
        "Max request length must be between 200 and 10,000"
    );
    s.max_context_length = 200;
    assert!(s.validate().is_ok());
}

#[test]
fn validate_requires_model() {
    let mut s = valid_settings();
    s.model = " ".to_string();
    assert_eq!(s.validate().unwrap_err().to_string(), "Please select a model");
}

#[test]
fn select_provider_picks_recommended_model() {
    let mut s = Settings::default();
    s.select_provider("anthropic", None);
    assert_eq!(s.model, "claude-3-sonnet-20240229");
    s.select_provider("anthropic", Some("claude-3-haiku-20240307"));
    assert_eq!(s.model, "claude-3-haiku-20240307");
    // Same provider without model keeps the current choice.
    s.select_provider("anthropic", None);
    assert_eq!(s.model, "claude-3-haiku-20240307");
}

#[test]
fn store_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert_eq!(store.get(SETTINGS_KEY).unwrap(), Settings::default());
    assert!(!store.contains(SETTINGS_KEY).unwrap());
}

#[test]
fn store_set_get_remove() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let settings = valid_settings();

    store.set(SETTINGS_KEY, &settings).unwrap();
    store.set(TEST_SETTINGS_KEY, &Settings::default()).unwrap();
    assert_eq!(store.get(SETTINGS_KEY).unwrap(), settings);

    store.remove(TEST_SETTINGS_KEY).unwrap();
    assert!(!store.contains(TEST_SETTINGS_KEY).unwrap());
    assert!(store.contains(SETTINGS_KEY).unwrap());

    // Removing twice is fine.
    store.remove(TEST_SETTINGS_KEY).unwrap();
}

#[test]
fn store_invalid_field_keeps_its_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), r#"{"settings": {"maxTokens": "lots"}}"#).unwrap();
    assert_eq!(store.get(SETTINGS_KEY).unwrap(), Settings::default());
    assert_eq!(store.load(SETTINGS_KEY).unwrap().skipped, vec!["maxTokens"]);
}

#[test]
fn store_invalid_field_keeps_every_valid_field() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let record = json!({
        "settings": {
            "provider": "anthropic",
            "apiKeyByProvider": { "openai": "sk-o", "anthropic": "sk-a" },
            "model": "claude-3-opus-20240229",
            "maxTokens": 150.5,
            "maxContextLength": 2000,
            "triggerKey": "cmd"
        }
    });
    std::fs::write(store.path(), record.to_string()).unwrap();

    let loaded = store.load(SETTINGS_KEY).unwrap();
    assert_eq!(loaded.skipped, vec!["maxTokens", "triggerKey"]);
    let s = loaded.settings;
    assert_eq!(s.provider, "anthropic");
    assert_eq!(s.model, "claude-3-opus-20240229");
    assert_eq!(s.api_key("openai"), "sk-o");
    assert_eq!(s.api_key("anthropic"), "sk-a");
    assert_eq!(s.max_context_length, 2000);
    assert_eq!(s.max_tokens, DEFAULT_MAX_TOKENS);
    assert_eq!(s.trigger_key, TriggerKey::Alt);
}

#[test]
fn store_invalid_api_key_entry_keeps_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let record = json!({
        "settings": { "apiKeyByProvider": { "openai": 42, "anthropic": "sk-a" } }
    });
    std::fs::write(store.path(), record.to_string()).unwrap();

    let loaded = store.load(SETTINGS_KEY).unwrap();
    assert_eq!(loaded.skipped, vec!["apiKeyByProvider.openai"]);
    assert_eq!(loaded.settings.api_key("anthropic"), "sk-a");
    assert_eq!(loaded.settings.api_key("openai"), "");
}

#[test]
fn store_non_object_record_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), r#"{"settings": "oops"}"#).unwrap();
    let loaded = store.load(SETTINGS_KEY).unwrap();
    assert_eq!(loaded.settings, Settings::default());
    assert_eq!(loaded.skipped, vec!["settings"]);
}

#[test]
fn changes_cover_the_fields_they_replace() {
    let changes = SettingsChanges {
        trigger_key: Some(TriggerKey::Ctrl),
        api_keys: vec![("openai".into(), "sk".into())],
        ..Default::default()
    };
    assert!(changes.covers("triggerKey"));
    assert!(changes.covers("apiKeyByProvider.openai"));
    assert!(!changes.covers("apiKeyByProvider.anthropic"));
    assert!(!changes.covers("maxTokens"));
    assert!(!changes.covers("settings"));
}

fn fixed_key(var: &str) -> Option<String> {
    (var == "ANTHROPIC_API_KEY").then(|| "sk-ant-env".to_string())
}

#[test]
fn store_key_lookup_fills_only_empty_keys_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).with_key_lookup(fixed_key);
    store.set(SETTINGS_KEY, &valid_settings()).unwrap();

    let read = store.get(SETTINGS_KEY).unwrap();
    assert_eq!(read.api_key("anthropic"), "sk-ant-env");
    assert_eq!(read.api_key("openai"), "sk-test");
    assert_eq!(store.get_stored(SETTINGS_KEY).unwrap().api_key("anthropic"), "");
}

#[test]
fn store_rejects_non_object_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "[1, 2]").unwrap();
    assert!(matches!(
        store.get(SETTINGS_KEY),
        Err(SettingsError::Invalid(_))
    ));
}

#[cfg(unix)]
#[test]
fn store_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.set(SETTINGS_KEY, &valid_settings()).unwrap();
    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn changes_apply_only_given_fields() {
    let mut s = valid_settings();
    let changes = SettingsChanges {
        provider: Some("anthropic".into()),
        max_context_length: Some(2000),
        api_keys: vec![("anthropic".into(), " sk-ant ".into())],
        ..Default::default()
    };
    changes.apply(&mut s);
    assert_eq!(s.provider, "anthropic");
    assert_eq!(s.model, "claude-3-sonnet-20240229");
    assert_eq!(s.max_context_length, 2000);
    assert_eq!(s.max_tokens, 150);
    assert_eq!(s.api_key("anthropic"), "sk-ant");
    assert_eq!(s.api_key("openai"), "sk-test");
    assert!(SettingsChanges::default().is_empty());
    assert!(!changes.is_empty());
}

#[test]
fn changes_model_without_provider() {
    let mut s = valid_settings();
    SettingsChanges {
        model: Some("gpt-4".into()),
        ..Default::default()
    }
    .apply(&mut s);
    assert_eq!(s.provider, "openai");
    assert_eq!(s.model, "gpt-4");
}

#[test]
fn store_without_key_lookup_reads_as_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert_eq!(store.get(SETTINGS_KEY).unwrap(), store.get_stored(SETTINGS_KEY).unwrap());
}
