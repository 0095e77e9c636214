//! JSON output of a document's annotations.

use serde::Serialize;
use tagbox_core::{Analysis, AnalysisWarning, DocumentAnnotations, PageAnnotations, TagboxError};

/// Serialized shape of one analyzed document.
#[derive(Debug, Serialize)]
pub struct DocumentRecord<'a> {
    /// File stem or other name of the source document.
    pub source: &'a str,
    pub page_count: usize,
    pub pages: &'a [PageAnnotations],
    pub warnings: &'a [AnalysisWarning],
}

impl<'a> DocumentRecord<'a> {
    pub fn new(source: &'a str, analysis: &'a Analysis<DocumentAnnotations>) -> Self {
        Self {
            source,
            page_count: analysis.value.pages.len(),
            pages: &analysis.value.pages,
            warnings: &analysis.warnings,
        }
    }
}

/// Pretty-printed JSON for `analysis` of the document named `source`.
///
/// # Errors
///
/// Returns [`TagboxError::Other`] if serialization fails.
pub fn document_json(
    source: &str,
    analysis: &Analysis<DocumentAnnotations>,
) -> Result<String, TagboxError> {
    serde_json::to_string_pretty(&DocumentRecord::new(source, analysis))
        .map_err(|e| TagboxError::Other(format!("JSON serialization failed: {e}")))
}
