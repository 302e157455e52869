//! Load, then annotate. Nothing in between.

use std::path::Path;

use crate::annotation::AnnotationResult;
use crate::annotator::Annotator;
use crate::error::Result;
use crate::source;

/// Run both stages on `path`. A load failure means the annotator is never
/// called.
pub async fn run(path: &Path, annotator: &Annotator) -> Result<AnnotationResult> {
    let text = source::load(path).await?;
    annotator.annotate(&text).await
}
