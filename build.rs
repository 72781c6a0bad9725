//! Build script: validates providers.json at compile time.

use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let config_path: PathBuf = [&manifest_dir, "config", "providers.json"].iter().collect();
    println!("cargo:rerun-if-changed={}", config_path.display());
    let json = std::fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. providers.json must exist and be valid.",
            config_path.display(),
            e
        )
    });
    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct ModelEntry {
        value: String,
        label: String,
    }
    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct ProviderEntry {
        id: String,
        name: String,
        api_key_url: String,
        continue_method: String,
        #[serde(default)]
        continue_info: Option<String>,
        models: Vec<ModelEntry>,
    }
    let entries: Vec<ProviderEntry> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "providers.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });
    for entry in &entries {
        if entry.models.is_empty() {
            panic!("providers.json: provider '{}' has no models", entry.id);
        }
        if entry.continue_method != "url" && entry.continue_method != "clipboard" {
            panic!(
                "providers.json: provider '{}' has unknown continue_method '{}'",
                entry.id, entry.continue_method
            );
        }
    }
}
