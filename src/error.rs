//! Failure kinds of a pipeline run.
//!
//! Every error surfaces to the caller unmodified. There is no partial
//! result: a run yields a full [`AnnotationResult`](crate::annotation::AnnotationResult)
//! or one of these.

use std::path::PathBuf;
use std::string::FromUtf8Error;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotateError {
    /// The source file is missing or unreadable.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source bytes are not valid UTF-8.
    #[error("{} is not valid UTF-8: {source}", .path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },

    #[error("input is {chars} characters, limit is {limit}")]
    InputTooLarge { chars: usize, limit: usize },

    #[error("no reply from the model within {}s", .after.as_secs_f64())]
    Timeout { after: Duration },

    /// The reply is not JSON at all.
    #[error("model reply is not valid JSON: {reason}")]
    MalformedResponse { reason: String },

    /// The reply is JSON but not an array of `{word, type, group}` objects.
    #[error("model reply violates the annotation schema{}: {reason}", .index.map(|i| format!(" at element {i}")).unwrap_or_default())]
    SchemaViolation { index: Option<usize>, reason: String },

    /// Transport, auth or provider-side failure.
    #[error("model service failed: {0}")]
    Service(String),
}

pub type Result<T> = std::result::Result<T, AnnotateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_violation_mentions_index() {
        let err = AnnotateError::SchemaViolation {
            index: Some(3),
            reason: "missing field `type`".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("at element 3"));
        assert!(msg.contains("missing field `type`"));
    }

    #[test]
    fn schema_violation_without_index() {
        let err = AnnotateError::SchemaViolation {
            index: None,
            reason: "expected an array".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "model reply violates the annotation schema: expected an array"
        );
    }

    #[test]
    fn io_error_mentions_path() {
        let err = AnnotateError::Io {
            path: PathBuf::from("/nope/subtitles.txt"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/nope/subtitles.txt"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = AnnotateError::Timeout {
            after: Duration::from_millis(1500),
        };
        assert!(err.to_string().contains("1.5s"));
    }
}
