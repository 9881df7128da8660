//! Configuration file support for the chat router

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::BackendKind;

/// Environment variable holding the Gemini API key
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable holding the DeepSeek (OpenRouter) API key
pub const DEEPSEEK_KEY_VAR: &str = "DEEPSEEK_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharlaConfig {
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub deepseek: DeepSeekConfig,
    #[serde(default)]
    pub translator: TranslatorConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Backend used for `auto` and unrecognized hints
    #[serde(default)]
    pub default_backend: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; absent or empty means the backend is not configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekConfig {
    /// OpenRouter API key; absent or empty means the backend is not configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_deepseek_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_deepseek_model")]
    pub model: String,

    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_translator_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_target_language")]
    pub target_language: String,

    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default = "default_translator_timeout")]
    pub timeout_secs: u64,
}

// Defaults

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_deepseek_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_deepseek_model() -> String {
    "deepseek-chat".to_string()
}

fn default_backend_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_translator_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_target_language() -> String {
    "es".to_string()
}

fn default_threshold() -> f64 {
    crate::pipeline::translator::DEFAULT_THRESHOLD
}

fn default_translator_timeout() -> u64 {
    10
}

/// Treat a missing or blank key as no credential
fn credential(api_key: &Option<String>) -> Option<&str> {
    api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_gemini_endpoint(),
            model: default_gemini_model(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

impl GeminiConfig {
    pub fn credential(&self) -> Option<&str> {
        credential(&self.api_key)
    }
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_deepseek_endpoint(),
            model: default_deepseek_model(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

impl DeepSeekConfig {
    pub fn credential(&self) -> Option<&str> {
        credential(&self.api_key)
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: default_translator_endpoint(),
            target_language: default_target_language(),
            threshold: default_threshold(),
            timeout_secs: default_translator_timeout(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Could not serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

impl CharlaConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: CharlaConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating missing parent directories
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `<config dir>/charla/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("charla").join("config.toml"))
    }

    /// Load from `path`, or from the default location when it exists, or fall
    /// back to defaults. Credentials are then overlaid from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(p)?,
                None => Self::default(),
            },
        };

        config.apply_env(|var| std::env::var(var).ok());
        Ok(config)
    }

    /// Override API keys with values found through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(GEMINI_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.gemini.api_key = Some(key);
        }
        if let Some(key) = lookup(DEEPSEEK_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.deepseek.api_key = Some(key);
        }
    }
}
