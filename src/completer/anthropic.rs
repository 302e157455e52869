use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiKey, Completer, endpoint};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const MESSAGES_PATH: &str = "/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;

/// Calls the Anthropic Messages API with a single user turn.
pub struct AnthropicCompleter {
    model: String,
    api_key: ApiKey,
    url: String,
    client: reqwest::Client,
}

impl AnthropicCompleter {
    pub fn new(model: String, api_key: ApiKey, base_url: Option<String>) -> Self {
        let base = base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Self {
            model,
            api_key,
            url: endpoint(base, MESSAGES_PATH),
            client: reqwest::Client::new(),
        }
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ApiRequest<'a> {
        ApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }

    fn extract_text(resp: ApiResponse) -> Result<String> {
        if resp.stop_reason.as_deref() == Some("max_tokens") {
            bail!(
                "Anthropic reply truncated at the {} output token limit; shorten the input",
                MAX_TOKENS
            );
        }

        let text: String = resp
            .content
            .iter()
            .filter_map(|block| {
                if block.content_type == "text" {
                    block.text.as_deref()
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            bail!("Anthropic API returned empty response");
        }

        if let Some(usage) = resp.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "anthropic token usage"
            );
        }

        Ok(text)
    }
}

#[async_trait]
impl Completer for AnthropicCompleter {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = self.build_request(prompt);

        let resp = self
            .client
            .post(&self.url)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .header("x-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Anthropic API error ({}): {}", status, text);
        }

        let api_resp: ApiResponse = resp.json().await?;
        Self::extract_text(api_resp)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completer(base_url: Option<&str>) -> AnthropicCompleter {
        AnthropicCompleter::new(
            "claude-sonnet-4-20250514".to_string(),
            ApiKey::new("sk-ant-test").unwrap(),
            base_url.map(str::to_string),
        )
    }

    #[test]
    fn default_url_targets_messages_api() {
        assert_eq!(completer(None).url, "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn base_url_override() {
        assert_eq!(
            completer(Some("http://127.0.0.1:9000/")).url,
            "http://127.0.0.1:9000/v1/messages"
        );
    }

    #[test]
    fn request_is_single_user_turn_at_zero_temperature() {
        let c = completer(None);
        let body = serde_json::to_value(c.build_request("annotate this")).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 8192,
                "temperature": 0.0,
                "messages": [{"role": "user", "content": "annotate this"}]
            })
        );
    }

    #[test]
    fn extract_text_joins_text_blocks() {
        let resp: ApiResponse = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "[{\"word\":"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "\"a\"}]"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }))
        .unwrap();
        assert_eq!(
            AnthropicCompleter::extract_text(resp).unwrap(),
            "[{\"word\":\"a\"}]"
        );
    }

    #[test]
    fn extract_text_empty_fails() {
        let resp: ApiResponse = serde_json::from_value(json!({"content": []})).unwrap();
        let err = AnthropicCompleter::extract_text(resp).unwrap_err();
        assert!(err.to_string().contains("empty response"));
    }

    #[test]
    fn extract_text_max_tokens_stop_is_truncation() {
        let resp: ApiResponse = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "[{\"word\":\"the\",\"type\":\"determiner\",\"group\":\"gram"}
            ],
            "stop_reason": "max_tokens",
            "usage": {"input_tokens": 900, "output_tokens": 8192}
        }))
        .unwrap();
        let err = AnthropicCompleter::extract_text(resp).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }
}
