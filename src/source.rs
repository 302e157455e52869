//! Reads the text to annotate.

use std::path::Path;

use crate::error::{AnnotateError, Result};

/// The full contents of one input file. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText(String);

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in Unicode scalar values, the unit of the input size limit.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// True when there is nothing worth annotating.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Read `path` as a single UTF-8 string. One read, no retries.
pub async fn load(path: &Path) -> Result<SourceText> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AnnotateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let text = String::from_utf8(bytes).map_err(|source| AnnotateError::Encoding {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "loaded source text");
    Ok(SourceText(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_reads_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subtitles.txt");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let text = load(&path).await.unwrap();
        assert_eq!(text.as_str(), "line one\nline two\n");
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.txt")).await.unwrap_err();
        assert!(matches!(err, AnnotateError::Io { .. }));
    }

    #[tokio::test]
    async fn load_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path()).await.unwrap_err();
        assert!(matches!(err, AnnotateError::Io { .. }));
    }

    #[tokio::test]
    async fn load_invalid_utf8_is_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, [0x63, 0x61, 0x66, 0xe9]).unwrap();

        let err = load(&path).await.unwrap_err();
        assert!(matches!(err, AnnotateError::Encoding { .. }));
    }

    #[tokio::test]
    async fn load_empty_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let text = load(&path).await.unwrap();
        assert!(text.is_blank());
        assert_eq!(text.char_count(), 0);
    }

    #[test]
    fn char_count_counts_scalars_not_bytes() {
        let text = SourceText::from("héllo");
        assert_eq!(text.char_count(), 5);
        assert_eq!(text.as_str().len(), 6);
    }
}
