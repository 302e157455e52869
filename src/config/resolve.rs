use std::time::Duration;

use anyhow::{Result, anyhow};

use super::StoredSettings;
use crate::annotator::AnnotatorConfig;
use crate::completer::{ApiKey, Provider, ServiceConfig};
use crate::consts::{DEFAULT_MAX_INPUT_CHARS, DEFAULT_TIMEOUT_SECS, MODEL_ENV, PROVIDER_ENV};

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_chars: Option<usize>,
}

/// Everything a run needs, fixed before the first I/O.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub service: ServiceConfig,
    pub annotator: AnnotatorConfig,
}

/// Merge overrides, environment, stored settings and defaults, in that
/// order of precedence. `env` looks up one variable; blank values count as
/// unset.
///
/// The model is not tied to the provider: a stored `model` or `AI_MODEL_ID`
/// is sent to whichever provider wins. A name from the other provider's
/// family only logs a warning, since a gateway behind a base URL override
/// may accept it.
pub fn resolve(
    overrides: Overrides,
    stored: StoredSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<RunSettings> {
    let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    let provider = match overrides.provider {
        Some(p) => p,
        None => match env(PROVIDER_ENV) {
            Some(v) => v.parse().map_err(|e: String| anyhow!("{PROVIDER_ENV}: {e}"))?,
            None => stored.provider.unwrap_or_default(),
        },
    };

    let model = overrides
        .model
        .filter(|m| !m.trim().is_empty())
        .or_else(|| env(MODEL_ENV))
        .or(stored.model)
        .unwrap_or_else(|| {
            tracing::warn!(
                provider = %provider,
                model = provider.default_model(),
                "no model configured, using provider default"
            );
            provider.default_model().to_string()
        });

    if let Some(family) = Provider::for_model(&model)
        && family != provider
    {
        tracing::warn!(
            provider = %provider,
            model = %model,
            "model looks like a {family} model; the {provider} API will likely reject it"
        );
    }

    let api_key = env(provider.key_env())
        .and_then(ApiKey::new)
        .ok_or_else(|| anyhow!("no {provider} credentials found. Set {}.", provider.key_env()))?;

    let timeout_secs = overrides
        .timeout_secs
        .or(stored.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let max_input_chars = overrides
        .max_chars
        .or(stored.max_chars)
        .unwrap_or(DEFAULT_MAX_INPUT_CHARS);

    Ok(RunSettings {
        service: ServiceConfig {
            provider,
            model,
            api_key,
            base_url: env(provider.base_url_env()),
        },
        annotator: AnnotatorConfig {
            max_input_chars,
            timeout: Duration::from_secs(timeout_secs),
        },
    })
}
