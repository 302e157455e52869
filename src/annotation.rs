//! Word annotations and the schema check applied to model replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnnotateError, Result};

const FIELDS: [&str; 3] = ["word", "type", "group"];

/// One word of the input, reduced and classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnnotation {
    /// Lemma (dictionary form).
    pub word: String,
    /// Grammatical category, e.g. `noun`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-form semantic category, e.g. `animal`.
    pub group: String,
}

impl WordAnnotation {
    pub fn new(word: impl Into<String>, kind: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            kind: kind.into(),
            group: group.into(),
        }
    }
}

/// Ordered output of one run. Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationResult(Vec<WordAnnotation>);

impl AnnotationResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordAnnotation> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<WordAnnotation> {
        self.0
    }

    /// Check that every record has three non-blank fields.
    pub fn validate(&self) -> Result<()> {
        for (index, entry) in self.0.iter().enumerate() {
            let fields = [&entry.word, &entry.kind, &entry.group];
            for (name, value) in FIELDS.iter().zip(fields) {
                if value.trim().is_empty() {
                    return Err(blank_field(index, name));
                }
            }
        }
        Ok(())
    }

    /// Build a result from an untrusted JSON value.
    ///
    /// The value must be an array of objects, each holding non-blank string
    /// `word`, `type` and `group`. Other keys are ignored. The first bad
    /// element rejects the whole reply.
    pub fn from_json(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(AnnotateError::SchemaViolation {
                    index: None,
                    reason: format!("expected an array, got {}", json_kind(&other)),
                });
            }
        };

        let mut entries = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let mut object = match item {
                Value::Object(object) => object,
                other => {
                    return Err(AnnotateError::SchemaViolation {
                        index: Some(index),
                        reason: format!("expected an object, got {}", json_kind(&other)),
                    });
                }
            };

            let mut take = |name: &str| -> Result<String> {
                match object.remove(name) {
                    Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
                    Some(Value::String(_)) => Err(blank_field(index, name)),
                    Some(other) => Err(AnnotateError::SchemaViolation {
                        index: Some(index),
                        reason: format!("field `{name}` must be a string, got {}", json_kind(&other)),
                    }),
                    None => Err(AnnotateError::SchemaViolation {
                        index: Some(index),
                        reason: format!("missing field `{name}`"),
                    }),
                }
            };

            let word = take("word")?;
            let kind = take("type")?;
            let group = take("group")?;
            entries.push(WordAnnotation { word, kind, group });
        }

        Ok(Self(entries))
    }
}

impl From<Vec<WordAnnotation>> for AnnotationResult {
    fn from(entries: Vec<WordAnnotation>) -> Self {
        Self(entries)
    }
}

fn blank_field(index: usize, name: &str) -> AnnotateError {
    AnnotateError::SchemaViolation {
        index: Some(index),
        reason: format!("field `{name}` is empty"),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
