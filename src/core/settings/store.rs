//! Key-value settings storage in `<config_dir>/storage.json`.
//!
//! The file holds one JSON object whose top-level keys are records: `settings` for the saved
//! options and `testSettings` for the short-lived record used by the connection test.
//! Writes go through a temp file and rename; on Unix the file is 0o600 since it holds API keys.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use serde_json::{Map, Value};

use super::{Settings, SettingsError, env_key};
use crate::core::paths;

/// Storage key of the saved settings.
pub const SETTINGS_KEY: &str = "settings";

/// Storage key of the transient connection-test settings.
pub const TEST_SETTINGS_KEY: &str = "testSettings";

/// Source of API keys for providers with no stored key, by variable name.
pub type KeyLookup = fn(&str) -> Option<String>;

/// A stored record merged over defaults, with the fields that could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSettings {
    pub settings: Settings,
    /// Record paths that were present but invalid, e.g. `triggerKey` or `apiKeyByProvider.openai`.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    key_lookup: Option<KeyLookup>,
}

impl SettingsStore {
    /// Store in the platform config directory. Empty API keys fall back to environment variables.
    pub fn open_default() -> Result<Self, SettingsError> {
        let path = paths::storage_path().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self {
            path,
            key_lookup: Some(env_key),
        })
    }

    /// Store backed by an explicit file. No environment fallback.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key_lookup: None,
        }
    }

    /// Fill empty keys on read from `lookup` instead of nothing (or the environment).
    pub fn with_key_lookup(mut self, lookup: KeyLookup) -> Self {
        self.key_lookup = Some(lookup);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, SettingsError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(map) => Ok(map),
            _ => Err(SettingsError::Invalid(format!(
                "{} must contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;

        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&tmp)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp, perms)?;
        }

        fs::rename(tmp, &self.path)?;
        Ok(())
    }

    /// True when a record exists under `key`.
    pub fn contains(&self, key: &str) -> Result<bool, SettingsError> {
        Ok(self.read_all()?.contains_key(key))
    }

    /// Load the record under `key` merged over defaults field by field, as stored.
    ///
    /// A missing record yields defaults. Invalid fields keep their default and are listed in
    /// `skipped`; every valid field is kept.
    pub fn load(&self, key: &str) -> Result<StoredSettings, SettingsError> {
        let map = self.read_all()?;
        match map.get(key) {
            Some(value) => merge_over_defaults(key, value),
            None => Ok(StoredSettings {
                settings: Settings::default(),
                skipped: Vec::new(),
            }),
        }
    }

    /// [`load`](Self::load) without the list of skipped fields.
    pub fn get_stored(&self, key: &str) -> Result<Settings, SettingsError> {
        Ok(self.load(key)?.settings)
    }

    /// Like [`get_stored`](Self::get_stored), with empty keys filled from the key lookup
    /// when this store has one. Use for API calls, never for saving.
    pub fn get(&self, key: &str) -> Result<Settings, SettingsError> {
        let mut settings = self.get_stored(key)?;
        self.fill_keys(&mut settings);
        Ok(settings)
    }

    /// Fill empty keys of `settings` from this store's key lookup, if any.
    pub fn fill_keys(&self, settings: &mut Settings) {
        if let Some(lookup) = self.key_lookup {
            settings.fill_keys_with(lookup);
        }
    }

    /// Replace the record under `key`.
    pub fn set(&self, key: &str, settings: &Settings) -> Result<(), SettingsError> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), serde_json::to_value(settings)?);
        self.write_all(&map)
    }

    /// Remove the record under `key`. Removing a missing record is not an error.
    pub fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

/// Overlay each field of `stored` on the default record, keeping only fields that parse.
///
/// Object-valued fields that fail as a whole (e.g. one non-string API key) are overlaid
/// entry by entry.
fn merge_over_defaults(key: &str, stored: &Value) -> Result<StoredSettings, SettingsError> {
    let mut merged = serde_json::to_value(Settings::default())?;
    let mut skipped = Vec::new();

    let Value::Object(fields) = stored else {
        log::warn!("Ignoring '{}' record: not a JSON object", key);
        return Ok(StoredSettings {
            settings: Settings::default(),
            skipped: vec![key.to_string()],
        });
    };

    for (field, value) in fields {
        if merged.get(field).is_none() {
            continue;
        }
        if accepts(&merged, field, value) {
            merged[field.as_str()] = value.clone();
            continue;
        }
        match (value, merged[field.as_str()].clone()) {
            (Value::Object(entries), Value::Object(mut base)) => {
                for (entry, v) in entries {
                    let mut candidate = base.clone();
                    candidate.insert(entry.clone(), v.clone());
                    if accepts(&merged, field, &Value::Object(candidate)) {
                        base.insert(entry.clone(), v.clone());
                    } else {
                        skipped.push(format!("{}.{}", field, entry));
                    }
                }
                merged[field.as_str()] = Value::Object(base);
            }
            _ => skipped.push(field.clone()),
        }
    }

    if !skipped.is_empty() {
        log::warn!(
            "Ignoring invalid fields of '{}' record: {}",
            key,
            skipped.join(", ")
        );
    }
    Ok(StoredSettings {
        settings: serde_json::from_value(merged)?,
        skipped,
    })
}

/// True when `merged` with `field` set to `value` still deserializes.
fn accepts(merged: &Value, field: &str, value: &Value) -> bool {
    let mut candidate = merged.clone();
    candidate[field] = value.clone();
    serde_json::from_value::<Settings>(candidate).is_ok()
}
