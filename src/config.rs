//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$INBOXPILOT_CONFIG` (environment variable)
//! 2. `~/.config/inboxpilot/config.toml` (Linux/macOS)
//!    `%APPDATA%\inboxpilot\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Where the JSON stores live.
    pub storage: StorageConfig,
    /// LLM provider settings.
    pub gateway: GatewayConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Where the JSON stores live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Override directory for inbox.json, prompts.json and results.json.
    pub data_dir: Option<PathBuf>,
}

/// LLM provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the Generative Language API.
    pub endpoint: String,
    /// Model name to request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in the generated answer.
    pub max_output_tokens: u32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: None }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            temperature: 0.2,
            max_output_tokens: 300,
            api_key_env: "GOOGLE_API_KEY".to_string(),
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("INBOXPILOT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("inboxpilot").join("config.toml"))
}

/// Return the directory holding the three JSON stores.
pub fn data_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.storage.data_dir {
        return dir.clone();
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inboxpilot")
}

/// Return the cache directory for logs.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inboxpilot")
}

/// Return the log file path.
pub fn log_file_path() -> PathBuf {
    cache_dir().join("inboxpilot.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.gateway.model, "gemini-2.5-flash-lite");
        assert_eq!(cfg.gateway.max_output_tokens, 300);
        assert_eq!(cfg.gateway.api_key_env, "GOOGLE_API_KEY");
        assert!(cfg.storage.data_dir.is_none());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.gateway.model, cfg.gateway.model);
        assert_eq!(parsed.gateway.endpoint, cfg.gateway.endpoint);
        assert_eq!(parsed.general.log_level, cfg.general.log_level);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[gateway]
model = "gemini-2.0-pro"
temperature = 0.7
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.gateway.model, "gemini-2.0-pro");
        assert!((cfg.gateway.temperature - 0.7).abs() < f32::EPSILON);
        // Other fields use defaults
        assert_eq!(cfg.gateway.max_output_tokens, 300);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_data_dir_override() {
        let mut cfg = Config::default();
        cfg.storage.data_dir = Some(PathBuf::from("/tmp/inboxpilot-test"));
        assert_eq!(data_dir(&cfg), PathBuf::from("/tmp/inboxpilot-test"));
    }
}
