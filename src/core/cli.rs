//! CLI-only commands: settings show/set/reset/test and the models list.
//!
//! These produce plain text output. Report builders return strings so they can be tested
//! without a terminal.

use crate::core::catalog::{self, ProviderInfo};
use crate::core::confirm::Confirm;
use crate::core::message::{MessageHandler, Request};
use crate::core::page::PageContext;
use crate::core::settings::{
    SETTINGS_KEY, Settings, SettingsChanges, SettingsError, SettingsStore, TEST_SETTINGS_KEY,
};

/// Page data sent by `config test`.
pub fn test_page() -> PageContext {
    PageContext {
        title: "Test Page".to_string(),
        url: "https://example.com".to_string(),
        meta_description: String::new(),
        selected_text: "This is a test.".to_string(),
        context_text: "This is a test of the API connection.".to_string(),
    }
}

fn key_status(settings: &Settings, stored: &Settings, provider: &str) -> &'static str {
    if !stored.api_key(provider).is_empty() {
        "set ✓"
    } else if !settings.api_key(provider).is_empty() {
        "from environment"
    } else {
        "not set"
    }
}

/// Text report of the settings file, the effective settings, and per-provider key status.
pub fn config_report(store: &SettingsStore) -> Result<String, SettingsError> {
    let stored = store.get_stored(SETTINGS_KEY)?;
    let settings = store.get(SETTINGS_KEY)?;
    let saved = if store.contains(SETTINGS_KEY)? {
        ""
    } else {
        " (defaults, not saved)"
    };

    let mut out = String::new();
    out.push_str(&format!("Settings:       {}{}\n", store.path().display(), saved));
    out.push_str(&format!(
        "Provider:       {} ({})\n",
        catalog::display_name(&settings.provider),
        settings.provider
    ));
    out.push_str(&format!("Model:          {}\n", settings.model));
    out.push_str(&format!("Max tokens:     {}\n", settings.max_tokens));
    out.push_str(&format!("Max context:    {} chars\n", settings.max_context_length));
    out.push_str(&format!("Trigger key:    {}\n", settings.trigger_key));
    for info in catalog::providers() {
        let label = format!("{} key:", info.name);
        let status = key_status(&settings, &stored, &info.id);
        if status == "not set" {
            out.push_str(&format!("{:<15} {} (get one at {})\n", label, status, info.api_key_url));
        } else {
            out.push_str(&format!("{:<15} {}\n", label, status));
        }
    }
    Ok(out)
}

/// Run `config`: print the settings report.
pub fn run_config_show(store: &SettingsStore) -> Result<(), SettingsError> {
    print!("{}", config_report(store)?);
    Ok(())
}

/// Apply `changes` to the saved settings, validate, and save.
///
/// Keys from the environment count for validation but are never written to the file.
pub fn save_settings(
    store: &SettingsStore,
    changes: &SettingsChanges,
) -> Result<Settings, SettingsError> {
    if let Some(provider) = &changes.provider
        && catalog::find(provider).is_none()
    {
        return Err(SettingsError::Invalid(format!(
            "Unknown API provider '{}'",
            provider
        )));
    }

    let stored = store.load(SETTINGS_KEY)?;
    let unreadable: Vec<&str> = stored
        .skipped
        .iter()
        .map(String::as_str)
        .filter(|field| !changes.covers(field))
        .collect();
    if !unreadable.is_empty() {
        return Err(SettingsError::Invalid(format!(
            "Saved settings have invalid fields ({}). Set them again or run `enhance config reset`.",
            unreadable.join(", ")
        )));
    }

    let mut settings = stored.settings;
    changes.apply(&mut settings);

    let mut effective = settings.clone();
    store.fill_keys(&mut effective);
    effective.validate()?;

    store.set(SETTINGS_KEY, &settings)?;
    log::info!(
        "Settings saved: provider={} model={}",
        settings.provider,
        settings.model
    );
    Ok(settings)
}

/// Run `config set`.
pub fn run_config_set(store: &SettingsStore, changes: &SettingsChanges) -> Result<(), SettingsError> {
    if changes.is_empty() {
        return Err(SettingsError::Invalid(
            "Nothing to change. See `enhance config set --help`.".to_string(),
        ));
    }
    save_settings(store, changes)?;
    println!("Settings saved successfully!");
    Ok(())
}

/// Run `config reset`: drop the saved record after confirmation.
pub fn run_config_reset(store: &SettingsStore, confirm: &Confirm) -> Result<(), SettingsError> {
    if !confirm("Reset all settings (including API keys) to defaults?") {
        println!("Cancelled.");
        return Ok(());
    }
    store.remove(SETTINGS_KEY)?;
    println!("Settings reset to defaults");
    Ok(())
}

/// Settings used by the connection test: saved settings with `changes` applied.
///
/// The returned record holds stored and given keys only. Keys from the environment count
/// for the checks here and are filled in again when the test request reads the record.
pub fn test_settings(
    store: &SettingsStore,
    changes: &SettingsChanges,
) -> Result<Settings, SettingsError> {
    let mut settings = store.get_stored(SETTINGS_KEY)?;
    changes.apply(&mut settings);
    let mut effective = settings.clone();
    store.fill_keys(&mut effective);

    let Some(info) = catalog::find(&effective.provider) else {
        return Err(SettingsError::Invalid(format!(
            "Unknown API provider '{}'",
            effective.provider
        )));
    };
    if effective.selected_api_key().is_empty() {
        return Err(SettingsError::Invalid(format!(
            "Please enter your {} API key before testing",
            info.name
        )));
    }
    if effective.model.trim().is_empty() {
        return Err(SettingsError::Invalid("Please select a model".to_string()));
    }
    Ok(settings)
}

/// Send a test request with `settings` through the `testAPI` action.
///
/// The transient `testSettings` record is removed afterwards whatever the outcome.
pub async fn test_connection(
    handler: &MessageHandler,
    settings: &Settings,
) -> Result<String, String> {
    let store = handler.store();
    store
        .set(TEST_SETTINGS_KEY, settings)
        .map_err(|e| e.to_string())?;

    let response = handler.handle(&Request::TestApi(test_page())).await;

    if let Err(e) = store.remove(TEST_SETTINGS_KEY) {
        log::warn!("Failed to remove {}: {}", TEST_SETTINGS_KEY, e);
    }

    if response.success {
        Ok(response.explanation.unwrap_or_default())
    } else {
        Err(response
            .error
            .unwrap_or_else(|| "Unknown error".to_string()))
    }
}

/// Run `config test`. Returns whether the test passed.
pub async fn run_config_test(
    handler: &MessageHandler,
    changes: &SettingsChanges,
) -> Result<bool, SettingsError> {
    let settings = test_settings(handler.store(), changes)?;
    eprintln!(
        "Testing {} with model {}...",
        catalog::display_name(&settings.provider),
        settings.model
    );
    match test_connection(handler, &settings).await {
        Ok(_) => {
            println!("✅ API test successful!");
            Ok(true)
        }
        Err(e) => {
            println!("❌ API test failed: {}", e);
            Ok(false)
        }
    }
}

/// Model table for the catalog, optionally filtered to one provider. `*` marks `current`.
pub fn models_table(provider: Option<&str>, current: &str) -> Result<String, SettingsError> {
    let selected: Vec<&ProviderInfo> = match provider {
        Some(id) => vec![catalog::find(id).ok_or_else(|| {
            SettingsError::Invalid(format!("Unknown API provider '{}'", id))
        })?],
        None => catalog::providers().iter().collect(),
    };

    let rows: Vec<(&str, &str, &str)> = selected
        .iter()
        .flat_map(|p| {
            p.models
                .iter()
                .map(move |m| (p.id.as_str(), m.value.as_str(), m.label.as_str()))
        })
        .collect();

    let provider_w = rows.iter().map(|r| r.0.len()).max().unwrap_or(8).max(8);
    let model_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(20).max(20);

    let mut out = String::new();
    out.push_str(&format!(
        "  {:<provider_w$}  {:<model_w$}  {}\n",
        "Provider", "Model", "Label"
    ));
    out.push_str(&format!(
        "  {}  {}  -----\n",
        "-".repeat(provider_w),
        "-".repeat(model_w)
    ));
    for (p, model, label) in &rows {
        let mark = if *model == current { "*" } else { " " };
        out.push_str(&format!(
            "{} {:<provider_w$}  {:<model_w$}  {}\n",
            mark, p, model, label
        ));
    }
    out.push_str(&format!("\n{} model(s) listed\n", rows.len()));
    Ok(out)
}

/// Run `models`.
pub fn run_models(store: &SettingsStore, provider: Option<&str>) -> Result<(), SettingsError> {
    let current = store.get_stored(SETTINGS_KEY)?.model;
    print!("{}", models_table(provider, &current)?);
    Ok(())
}
