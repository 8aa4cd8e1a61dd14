use crate::error::{MinerError, Result};
use crate::llm_config::{LlmConfig, LlmProviderConfig};
use crate::masks::Mask;
use crate::offline_synthesizer::OfflineSynthesizer;
use crate::regex_library::validate_patterns;
use crate::traits::{MaskSynthesizer, SynthOptions};
use async_trait::async_trait;
use std::time::Duration;

pub const MASK_SYNTH_PROMPT: &str = r#"You are a deterministic assistant that analyses server logs.
Given the following sample logs delimited by <LOGS>, produce a JSON array of objects.
Each object must contain fields: label, pattern (regex), and justification.
Reject overly generic patterns or those using `.*` unless anchored to a prefix and suffix.
Only return valid JSON with double quoted keys.
<LOGS>
{logs}
</LOGS>"#;

pub fn build_prompt(sample: &[String]) -> String {
    MASK_SYNTH_PROMPT.replace("{logs}", &sample.join("\n"))
}

/// Extract the JSON mask array from free-form model output
pub fn parse_llm_response(llm_output: &str) -> Result<Vec<Mask>> {
    let json_start = llm_output.find('[');
    let json_end = llm_output.rfind(']').map(|i| i + ']'.len_utf8());

    let json_str = match (json_start, json_end) {
        (Some(start), Some(end)) if start < end => &llm_output[start..end],
        _ => {
            return Err(MinerError::Llm(format!(
                "No JSON array in LLM response: {}",
                llm_output
            )))
        }
    };

    let masks: Vec<Mask> = serde_json::from_str(json_str).map_err(|e| {
        MinerError::Llm(format!(
            "Failed to parse LLM JSON response: {}. Response: {}",
            e, llm_output
        ))
    })?;

    Ok(masks)
}

/// Single provider client for making API calls
struct ProviderClient<'a> {
    config: &'a LlmProviderConfig,
    http_client: &'a reqwest::Client,
}

impl ProviderClient<'_> {
    async fn synthesize(&self, sample: &[String], options: &SynthOptions) -> Result<Vec<Mask>> {
        let text = match self.config.provider.as_str() {
            "mock" => return OfflineSynthesizer::new().synthesize_sync(sample),
            "ollama" => self.call_ollama(sample, options).await?,
            "openai" => self.call_openai(sample, options).await?,
            "anthropic" => self.call_anthropic(sample, options).await?,
            other => return Err(MinerError::Llm(format!("Unsupported provider: {}", other))),
        };
        parse_llm_response(&text)
    }

    async fn post_json(&self, request: reqwest::RequestBuilder) -> Result<serde_json::Value> {
        let mut request = request;
        if let Some(secs) = self.config.timeout_secs {
            request = request.timeout(Duration::from_secs(secs));
        }
        let response = request
            .send()
            .await
            .map_err(|e| MinerError::Llm(format!("{} request failed: {}", self.config.name, e)))?;
        let status = response.status();
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MinerError::Llm(format!("{} returned invalid JSON: {}", self.config.name, e)))?;
        if !status.is_success() {
            return Err(MinerError::Llm(format!("{} API error: {}", self.config.name, json)));
        }
        Ok(json)
    }

    async fn call_ollama(&self, sample: &[String], options: &SynthOptions) -> Result<String> {
        let endpoint = self
            .config
            .endpoint
            .as_ref()
            .ok_or_else(|| MinerError::Llm("Ollama endpoint not configured".to_string()))?;

        let request_body = serde_json::json!({
            "model": self.config.model,
            "prompt": build_prompt(sample),
            "stream": false,
            "options": {
                "temperature": options.temperature,
                "num_predict": options.max_tokens,
            }
        });

        let json = self
            .post_json(
                self.http_client
                    .post(format!("{}/api/generate", endpoint))
                    .json(&request_body),
            )
            .await?;

        json.get("response")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| MinerError::Llm("No response from Ollama".to_string()))
    }

    async fn call_openai(&self, sample: &[String], options: &SynthOptions) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| MinerError::Llm("OpenAI API key not configured".to_string()))?;
        let endpoint = self
            .config
            .endpoint
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string());

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": build_prompt(sample)
                }
            ],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens
        });

        let json = self
            .post_json(
                self.http_client
                    .post(endpoint)
                    .header("Authorization", format!("Bearer {}", api_key))
                    .json(&request_body),
            )
            .await?;

        json.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| MinerError::Llm("No response from OpenAI".to_string()))
    }

    async fn call_anthropic(&self, sample: &[String], options: &SynthOptions) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| MinerError::Llm("Anthropic API key not configured".to_string()))?;
        let endpoint = self
            .config
            .endpoint
            .clone()
            .unwrap_or_else(|| "https://api.anthropic.com/v1/messages".to_string());

        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "messages": [
                {
                    "role": "user",
                    "content": build_prompt(sample)
                }
            ]
        });

        let json = self
            .post_json(
                self.http_client
                    .post(endpoint)
                    .header("x-api-key", api_key)
                    .header("anthropic-version", "2023-06-01")
                    .json(&request_body),
            )
            .await?;

        json.get("content")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| MinerError::Llm("No response from Anthropic".to_string()))
    }
}

/// Model-backed mask synthesizer
pub struct LlmSynthesizer {
    config: LlmConfig,
    http_client: reqwest::Client,
    name: String,
}

impl LlmSynthesizer {
    pub fn new(config: LlmConfig) -> Result<Self> {
        config.validate()?;

        let name = config
            .providers
            .iter()
            .map(|p| format!("{}/{}", p.provider, p.model))
            .collect::<Vec<_>>()
            .join(",");

        tracing::info!("🤖 LLM mask synthesis configured with {} provider(s): {}", config.providers.len(), name);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| MinerError::Llm(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            name,
        })
    }
}

#[async_trait]
impl MaskSynthesizer for LlmSynthesizer {
    /// Try providers in order; the first one returning valid masks wins
    async fn synthesize(&self, sample: &[String], options: &SynthOptions) -> Result<Vec<Mask>> {
        let mut last_error = None;
        for provider in &self.config.providers {
            let client = ProviderClient {
                config: provider,
                http_client: &self.http_client,
            };
            let outcome = match client.synthesize(sample, options).await {
                Ok(masks) => validate_patterns(masks.iter().map(|m| m.pattern.as_str()), false)
                    .map(|_| masks),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(masks) => {
                    tracing::debug!("Provider {} produced {} masks", provider.name, masks.len());
                    return Ok(masks);
                }
                Err(e) => {
                    tracing::warn!("Provider {} failed: {}", provider.name, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| MinerError::Llm("All LLM providers failed".to_string())))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_sample() {
        let prompt = build_prompt(&["line one".to_string(), "line two".to_string()]);
        assert!(prompt.contains("<LOGS>\nline one\nline two\n</LOGS>"));
    }

    #[test]
    fn test_parse_llm_response_with_chatter() {
        let output = r#"Sure! Here are the masks:
[{"label": "NUMBER", "pattern": "\\d+", "justification": "numbers"},
 {"label": "IP", "pattern": "\\d+\\.\\d+\\.\\d+\\.\\d+"}]
Hope this helps."#;
        let masks = parse_llm_response(output).unwrap();
        assert_eq!(masks.len(), 2);
        assert_eq!(masks[0], Mask::new("NUMBER", r"\d+", "numbers"));
        assert_eq!(masks[1].justification, "");
    }

    #[test]
    fn test_parse_llm_response_uses_mask_schema() {
        let masks = parse_llm_response(r#"[{"label": "HEX", "pattern": "0x[0-9a-f]+", "confidence": 0.9}]"#).unwrap();
        assert_eq!(masks, vec![Mask::new("HEX", "0x[0-9a-f]+", "")]);
        assert!(matches!(parse_llm_response(r#"[{"pattern": "\d+"}]"#), Err(MinerError::Llm(_))));
    }

    #[test]
    fn test_parse_llm_response_without_array() {
        assert!(matches!(parse_llm_response("no json here"), Err(MinerError::Llm(_))));
        assert!(matches!(parse_llm_response("[not json]"), Err(MinerError::Llm(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_uses_offline_rules() {
        let synth = LlmSynthesizer::new(LlmConfig::mock()).unwrap();
        let sample = vec!["INFO open /tmp/x".to_string()];
        let masks = synth.synthesize(&sample, &SynthOptions::default()).await.unwrap();
        let expected = OfflineSynthesizer::new().synthesize_sync(&sample).unwrap();
        assert_eq!(masks, expected);
        assert_eq!(synth.name(), "mock/mock");
    }
}
