//! Turns a [`SourceText`] into an [`AnnotationResult`] with one model call.
//!
//! The model is not trusted: its reply is parsed and schema-checked before
//! anything is returned. There is no retry. A failed call is reported as is
//! and the caller decides whether repeating it is worth the cost.

use std::sync::Arc;
use std::time::Duration;

use crate::annotation::AnnotationResult;
use crate::completer::Completer;
use crate::consts::{DEFAULT_MAX_INPUT_CHARS, DEFAULT_TIMEOUT_SECS};
use crate::error::{AnnotateError, Result};
use crate::prompts::annotate::build_annotation_prompt;
use crate::source::SourceText;

#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// Largest accepted input, in characters.
    pub max_input_chars: usize,
    /// Upper bound on one `complete` call.
    pub timeout: Duration,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct Annotator {
    completer: Arc<dyn Completer>,
    config: AnnotatorConfig,
}

impl Annotator {
    pub fn new(completer: Arc<dyn Completer>, config: AnnotatorConfig) -> Self {
        Self { completer, config }
    }

    /// Annotate every word of `text`.
    ///
    /// Blank input short-circuits to an empty result without contacting
    /// the service. Otherwise exactly one `complete` call is made.
    pub async fn annotate(&self, text: &SourceText) -> Result<AnnotationResult> {
        if text.is_blank() {
            tracing::debug!("blank input, skipping model call");
            return Ok(AnnotationResult::empty());
        }

        let chars = text.char_count();
        if chars > self.config.max_input_chars {
            return Err(AnnotateError::InputTooLarge {
                chars,
                limit: self.config.max_input_chars,
            });
        }

        let prompt = build_annotation_prompt(text.as_str());
        tracing::info!(
            provider = self.completer.name(),
            chars,
            prompt_len = prompt.len(),
            "requesting annotation"
        );

        let reply = tokio::time::timeout(self.config.timeout, self.completer.complete(&prompt))
            .await
            .map_err(|_| AnnotateError::Timeout {
                after: self.config.timeout,
            })?
            .map_err(|e| AnnotateError::Service(format!("{e:#}")))?;

        let result = parse_reply(&reply)?;
        tracing::debug!(words = result.len(), "annotation parsed");
        Ok(result)
    }
}

/// Parse and validate a raw model reply.
pub fn parse_reply(reply: &str) -> Result<AnnotationResult> {
    let json_str = extract_json(reply);
    let value: serde_json::Value =
        serde_json::from_str(json_str).map_err(|e| AnnotateError::MalformedResponse {
            reason: e.to_string(),
        })?;
    let result = AnnotationResult::from_json(value)?;
    result.validate()?;
    Ok(result)
}

/// Extract JSON from text that may be wrapped in markdown code fences.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(after) = trimmed.strip_prefix("```json")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }
    if let Some(after) = trimmed.strip_prefix("```")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }

    trimmed
}
