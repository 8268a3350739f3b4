//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default Gemini REST endpoint
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default text-generation model
pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub tokenizer_model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub local_baseline: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            tokenizer_model: tokenizer_name(DEFAULT_MODEL),
            timeout_ms: 60000,
            max_retries: 0,
            retry_delay_ms: 1000,
            local_baseline: false,
        }
    }
}

/// Model id without the provider's `models/` prefix
fn tokenizer_name(model: &str) -> String {
    model.trim_start_matches("models/").to_string()
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable is required"))?;

        let api_base =
            std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let tokenizer_model =
            std::env::var("TOKENIZER_MODEL").unwrap_or_else(|_| tokenizer_name(&model));

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "60000".to_string())
            .parse::<u64>()?;

        let max_retries = std::env::var("MAX_RETRIES")
            .unwrap_or_else(|_| "0".to_string())
            .parse::<u32>()?;

        let retry_delay_ms = std::env::var("RETRY_DELAY_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()?;

        let local_baseline = std::env::var("LOCAL_BASELINE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            api_key,
            api_base,
            model,
            tokenizer_model,
            timeout_ms,
            max_retries,
            retry_delay_ms,
            local_baseline,
        })
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("API key is required"));
        }

        if self.api_base.is_empty() {
            return Err(anyhow::anyhow!("API base URL is required"));
        }

        if self.model.is_empty() {
            return Err(anyhow::anyhow!("Model id is required"));
        }

        Ok(())
    }

    /// Model path segment, always carrying the `models/` prefix
    pub fn model_path(&self) -> String {
        if self.model.starts_with("models/") || self.model.starts_with("tunedModels/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = TranslatorConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_key() {
        let config = TranslatorConfig {
            api_key: "".to_string(),
            api_base: "https://test.com".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_tokenizer_strips_prefix() {
        let config = TranslatorConfig::default();
        assert_eq!(config.tokenizer_model, "gemini-2.5-flash");
        assert_eq!(config.model_path(), "models/gemini-2.5-flash");
    }

    #[test]
    fn test_model_path_adds_prefix() {
        let config = TranslatorConfig {
            model: "gemini-1.5-pro".to_string(),
            ..Default::default()
        };
        assert_eq!(config.model_path(), "models/gemini-1.5-pro");
    }

    #[test]
    fn test_file_round_trip_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_key": "abc", "local_baseline": true}"#).unwrap();

        let config = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(config.api_key, "abc");
        assert!(config.local_baseline);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_retries, 0);

        config.to_file(&path).unwrap();
        let reloaded = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(reloaded.api_key, "abc");
    }
}
