use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiKey, Completer, endpoint};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const CHAT_PATH: &str = "/v1/chat/completions";

/// Calls an OpenAI-compatible chat completions endpoint.
pub struct OpenAiCompleter {
    model: String,
    api_key: ApiKey,
    url: String,
    client: reqwest::Client,
}

impl OpenAiCompleter {
    pub fn new(model: String, api_key: ApiKey, base_url: Option<String>) -> Self {
        let base = base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Self {
            model,
            api_key,
            url: endpoint(base, CHAT_PATH),
            client: reqwest::Client::new(),
        }
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }

    fn extract_text(resp: ChatResponse) -> Result<String> {
        if let Some(usage) = &resp.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "openai token usage"
            );
        }

        let Some(choice) = resp.choices.into_iter().next() else {
            bail!("OpenAI API returned no choices");
        };
        if choice.finish_reason.as_deref() == Some("length") {
            bail!("OpenAI reply truncated at the model's output token limit; shorten the input");
        }

        let text = choice.message.content.unwrap_or_default();

        if text.is_empty() {
            bail!("OpenAI API returned empty response");
        }
        Ok(text)
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = self.build_request(prompt);

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("OpenAI API error ({}): {}", status, text);
        }

        let chat: ChatResponse = resp.json().await?;
        Self::extract_text(chat)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
