//! Pipeline Configuration
//!
//! Loads and saves the publish pipeline's configuration from
//! `~/.skillpub/skillpub.json`. Missing fields are merged with defaults so
//! a partial config file keeps working across upgrades.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file name within the skillpub directory.
const CONFIG_FILENAME: &str = "skillpub.json";

/// Pipeline configuration. Thresholds here feed the validator; the
/// registry section feeds the HTTP client; `concurrency` and
/// `publish_timeout_secs` feed the batch publisher.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub registry_api_url: String,
    pub registry_api_key: String,
    /// Maximum documents published concurrently.
    pub concurrency: usize,
    /// Per-document publish call timeout.
    pub publish_timeout_secs: u64,
    /// Inclusive description length bounds, in characters.
    pub description_min_chars: usize,
    pub description_max_chars: usize,
    /// Soft authoring limit on body length, in lines.
    pub max_body_lines: usize,
    /// Extra category map entries merged over the builtin table.
    #[serde(default)]
    pub categories: HashMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        default_config()
    }
}

/// Returns the default `PipelineConfig`. The API key has no sensible
/// default and is left empty for the caller to fill in.
pub fn default_config() -> PipelineConfig {
    PipelineConfig {
        registry_api_url: "https://registry.skillpub.dev".to_string(),
        registry_api_key: String::new(),
        concurrency: 4,
        publish_timeout_secs: 30,
        description_min_chars: 80,
        description_max_chars: 1024,
        max_body_lines: 150,
        categories: HashMap::new(),
    }
}

/// Returns the skillpub config directory: `~/.skillpub`.
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/root"))
        .join(".skillpub")
}

/// Returns the full path to the config file: `~/.skillpub/skillpub.json`.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILENAME)
}

/// Load the pipeline config from disk, merging missing fields with
/// defaults.
///
/// Returns `None` if the config file does not exist or cannot be parsed;
/// callers then run on `default_config()` plus CLI flags.
pub fn load_config() -> Option<PipelineConfig> {
    let config_path = get_config_path();
    if !config_path.exists() {
        return None;
    }

    let contents = fs::read_to_string(&config_path).ok()?;
    let mut config: PipelineConfig = serde_json::from_str(&contents).ok()?;

    // Merge defaults for unset fields
    let defaults = default_config();

    if config.registry_api_url.is_empty() {
        config.registry_api_url = defaults.registry_api_url;
    }
    if config.concurrency == 0 {
        config.concurrency = defaults.concurrency;
    }
    if config.publish_timeout_secs == 0 {
        config.publish_timeout_secs = defaults.publish_timeout_secs;
    }
    if config.description_min_chars == 0 {
        config.description_min_chars = defaults.description_min_chars;
    }
    if config.description_max_chars == 0 {
        config.description_max_chars = defaults.description_max_chars;
    }
    if config.max_body_lines == 0 {
        config.max_body_lines = defaults.max_body_lines;
    }

    Some(config)
}

/// Save the pipeline config to `~/.skillpub/skillpub.json`, creating the
/// directory if needed. The file may contain the registry API key, so it
/// is not world-readable material; callers manage permissions.
pub fn save_config(config: &PipelineConfig) -> Result<()> {
    let dir = get_config_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir).context("Failed to create skillpub directory")?;
    }

    let config_path = get_config_path();
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&config_path, &json).context("Failed to write config file")?;

    Ok(())
}

/// Resolve a path that may start with `~` to an absolute path.
pub fn resolve_path(p: &str) -> String {
    if let Some(rest) = p.strip_prefix('~') {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root"));
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        home.join(rest).to_string_lossy().to_string()
    } else {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_thresholds() {
        let config = default_config();
        assert_eq!(config.description_min_chars, 80);
        assert_eq!(config.description_max_chars, 1024);
        assert_eq!(config.max_body_lines, 150);
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_resolve_path_with_tilde() {
        let resolved = resolve_path("~/skills");
        assert!(!resolved.starts_with('~'));
        assert!(resolved.ends_with("skills"));
    }

    #[test]
    fn test_resolve_path_without_tilde() {
        let path = "/srv/skills";
        assert_eq!(resolve_path(path), path);
    }

    #[test]
    fn test_partial_config_merges_defaults() {
        let json = r#"{"registryApiUrl":"","registryApiKey":"k","concurrency":0,
                       "publishTimeoutSecs":0,"descriptionMinChars":0,
                       "descriptionMaxChars":0,"maxBodyLines":0}"#;
        let mut config: PipelineConfig = serde_json::from_str(json).unwrap();
        let defaults = default_config();
        if config.concurrency == 0 {
            config.concurrency = defaults.concurrency;
        }
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.registry_api_key, "k");
    }
}
