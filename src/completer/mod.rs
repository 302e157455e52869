pub mod anthropic;
pub mod mock;
pub mod openai;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use anthropic::AnthropicCompleter;
use openai::OpenAiCompleter;

/// The external text-completion service: submit a prompt, get text back.
///
/// Implementations hold only read-only configuration, so one instance can
/// serve concurrent callers.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Supported completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Anthropic];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_env(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Environment variable overriding this provider's endpoint.
    pub fn base_url_env(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_BASE_URL",
            Provider::Anthropic => "ANTHROPIC_BASE_URL",
        }
    }

    /// The provider whose public model family `model` belongs to, if it is
    /// recognisable by name.
    pub fn for_model(model: &str) -> Option<Provider> {
        let model = model.trim().to_ascii_lowercase();
        if model.starts_with("claude") {
            return Some(Provider::Anthropic);
        }
        let o_series = model.starts_with('o')
            && model[1..].starts_with(|c: char| c.is_ascii_digit());
        if model.starts_with("gpt-") || model.starts_with("chatgpt") || o_series {
            return Some(Provider::OpenAi);
        }
        None
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => crate::consts::DEFAULT_OPENAI_MODEL,
            Provider::Anthropic => crate::consts::DEFAULT_ANTHROPIC_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown provider `{s}` (expected openai or anthropic)"))
    }
}

/// An API credential. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for an empty or blank key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Everything needed to reach a provider.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key: ApiKey,
    /// Endpoint override; `None` uses the provider's public API.
    pub base_url: Option<String>,
}

/// Build the adapter for the configured provider.
pub fn connect(config: ServiceConfig) -> Arc<dyn Completer> {
    match config.provider {
        Provider::OpenAi => Arc::new(OpenAiCompleter::new(
            config.model,
            config.api_key,
            config.base_url,
        )),
        Provider::Anthropic => Arc::new(AnthropicCompleter::new(
            config.model,
            config.api_key,
            config.base_url,
        )),
    }
}

/// Join a base URL and a path without doubling slashes.
fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("Anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
    }

    #[test]
    fn provider_rejects_unknown() {
        let err = "gemini".parse::<Provider>().unwrap_err();
        assert!(err.contains("gemini"));
    }

    #[test]
    fn provider_display_round_trips() {
        for provider in Provider::ALL {
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn for_model_recognises_families() {
        assert_eq!(Provider::for_model("claude-sonnet-4-20250514"), Some(Provider::Anthropic));
        assert_eq!(Provider::for_model("gpt-4o-mini"), Some(Provider::OpenAi));
        assert_eq!(Provider::for_model("o3-mini"), Some(Provider::OpenAi));
        assert_eq!(Provider::for_model("llama3:8b"), None);
        assert_eq!(Provider::for_model("orca"), None);
        assert_eq!(Provider::for_model(""), None);
    }

    #[test]
    fn api_key_rejects_blank() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert!(ApiKey::new("sk-test").is_some());
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret-value").unwrap();
        let config = ServiceConfig {
            provider: Provider::OpenAi,
            model: "gpt-4o-mini".to_string(),
            api_key: key,
            base_url: None,
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret-value"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn connect_picks_adapter() {
        let completer = connect(ServiceConfig {
            provider: Provider::Anthropic,
            model: "claude".to_string(),
            api_key: ApiKey::new("k").unwrap(),
            base_url: None,
        });
        assert_eq!(completer.name(), "anthropic");
    }

    #[test]
    fn endpoint_joins_cleanly() {
        assert_eq!(
            endpoint("http://localhost:8080/", "/v1/messages"),
            "http://localhost:8080/v1/messages"
        );
        assert_eq!(
            endpoint("https://api.openai.com", "v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
