use crate::error::{MinerError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a single LLM provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    pub name: String,
    pub provider: String,  // "openai", "ollama", "anthropic", "mock"
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,  // For Ollama or custom endpoints
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Providers tried in order until one returns usable masks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub providers: Vec<LlmProviderConfig>,
}

pub const SUPPORTED_PROVIDERS: [&str; 4] = ["ollama", "openai", "anthropic", "mock"];

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            providers: vec![LlmProviderConfig {
                name: "ollama".to_string(),
                provider: "ollama".to_string(),
                model: "llama3".to_string(),
                api_key: None,
                endpoint: Some("http://localhost:11434".to_string()),
                timeout_secs: Some(60),
            }],
        }
    }
}

impl LlmConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        // A provider list file takes precedence over single-provider variables
        if let Ok(config_path) = std::env::var("LLM_CONFIG_FILE") {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring invalid LLM config {}: {}", config_path, e),
                },
                Err(e) => tracing::warn!("Cannot read LLM config {}: {}", config_path, e),
            }
        }

        let provider = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "ollama".to_string());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| match provider.as_str() {
            "openai" => "gpt-4".to_string(),
            "anthropic" => "claude-3-sonnet-20240229".to_string(),
            _ => "llama3".to_string(),
        });
        let api_key = std::env::var("LLM_API_KEY").ok();
        let endpoint = std::env::var("OLLAMA_ENDPOINT").ok().or_else(|| {
            (provider == "ollama").then(|| "http://localhost:11434".to_string())
        });

        Self {
            providers: vec![LlmProviderConfig {
                name: provider.clone(),
                provider,
                model,
                api_key,
                endpoint,
                timeout_secs: Some(60),
            }],
        }
    }

    /// A config whose only provider replays the offline rules
    pub fn mock() -> Self {
        Self {
            providers: vec![LlmProviderConfig {
                name: "mock".to_string(),
                provider: "mock".to_string(),
                model: "mock".to_string(),
                api_key: None,
                endpoint: None,
                timeout_secs: None,
            }],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(MinerError::InvalidConfig(
                "At least one LLM provider must be configured".to_string(),
            ));
        }

        for p in &self.providers {
            if !SUPPORTED_PROVIDERS.contains(&p.provider.as_str()) {
                return Err(MinerError::InvalidConfig(format!(
                    "Unsupported provider: {}",
                    p.provider
                )));
            }
            match p.provider.as_str() {
                "openai" | "anthropic" if p.api_key.is_none() => {
                    return Err(MinerError::InvalidConfig(format!(
                        "Provider {} requires an API key",
                        p.name
                    )));
                }
                "ollama" if p.endpoint.is_none() => {
                    return Err(MinerError::InvalidConfig(format!(
                        "Provider {} requires an endpoint",
                        p.name
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
