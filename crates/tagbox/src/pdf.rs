//! Top-level PDF document type.

use tagbox_core::{
    Analysis, AnalysisWarning, AnalyzeOptions, DocumentAnnotations, DocumentContent, NoopObserver,
    TagboxError, WalkObserver, WarningSink, analyze_document_with,
};
use tagbox_parse::{FontStore, LopdfDocument};

/// A loaded PDF document, ready for analysis.
///
/// Opening interprets every page and reads the structure tree once;
/// [`Pdf::analyze`] and [`Pdf::walk_structure`] then work on the loaded
/// content without touching the file again.
///
/// # Example
///
/// ```ignore
/// use tagbox::Pdf;
///
/// let pdf = Pdf::open(&bytes, None)?;
/// println!("{} pages, tagged: {}", pdf.page_count(), pdf.has_structure_tree());
/// let analysis = pdf.analyze()?;
/// ```
pub struct Pdf {
    doc: LopdfDocument,
    options: AnalyzeOptions,
    content: DocumentContent,
    fonts: FontStore,
    /// Problems met while loading, reported again with every analysis.
    load_warnings: Vec<AnalysisWarning>,
}

impl std::fmt::Debug for Pdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pdf")
            .field("page_count", &self.page_count())
            .field("fonts", &self.fonts.len())
            .field("load_warnings", &self.load_warnings.len())
            .finish_non_exhaustive()
    }
}

impl Pdf {
    /// Open a PDF document from a file path.
    ///
    /// Reads the file into memory and calls [`Pdf::open`].
    ///
    /// # Errors
    ///
    /// Returns [`TagboxError`] if the file cannot be read or is not a valid PDF.
    #[cfg(feature = "std")]
    pub fn open_file(
        path: impl AsRef<std::path::Path>,
        options: Option<AnalyzeOptions>,
    ) -> Result<Self, TagboxError> {
        let bytes =
            std::fs::read(path.as_ref()).map_err(|e| TagboxError::IoError(e.to_string()))?;
        Self::open(&bytes, options)
    }

    /// Open a PDF document from bytes.
    ///
    /// `options` defaults to [`AnalyzeOptions::default`].
    ///
    /// # Errors
    ///
    /// Returns [`TagboxError`] if the bytes are not a readable PDF, the
    /// document is encrypted, or the input exceeds
    /// [`AnalyzeOptions::max_input_bytes`]. Unreadable pages are not errors;
    /// they become empty pages with a warning.
    pub fn open(bytes: &[u8], options: Option<AnalyzeOptions>) -> Result<Self, TagboxError> {
        let options = options.unwrap_or_default();
        let doc = LopdfDocument::open(bytes, &options)?;
        let loaded = doc.load(&options);

        let mut sink = WarningSink::new(options.collect_warnings);
        sink.extend(loaded.warnings);
        tracing::debug!(
            pages = doc.page_count(),
            fonts = loaded.fonts.len(),
            tagged = loaded.content.structure.is_some(),
            "document loaded"
        );
        Ok(Self {
            doc,
            options,
            content: loaded.content,
            fonts: loaded.fonts,
            load_warnings: sink.into_vec(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// Whether the document declares a logical structure tree.
    pub fn has_structure_tree(&self) -> bool {
        self.doc.has_structure_tree()
    }

    pub fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    /// Pages, marked content and structure tree as loaded.
    pub fn content(&self) -> &DocumentContent {
        &self.content
    }

    /// Warnings raised while loading the document.
    pub fn load_warnings(&self) -> &[AnalysisWarning] {
        &self.load_warnings
    }

    /// Compute the labeled regions of every page.
    ///
    /// The returned warnings start with those raised while loading.
    ///
    /// # Errors
    ///
    /// Never fails for a document that [`Pdf::open`] accepted.
    pub fn analyze(&self) -> Result<Analysis<DocumentAnnotations>, TagboxError> {
        self.walk_structure(&mut NoopObserver)
    }

    /// [`Pdf::analyze`] with `observer` notified of every finished
    /// structure element.
    ///
    /// # Errors
    ///
    /// See [`Pdf::analyze`].
    pub fn walk_structure(
        &self,
        observer: &mut dyn WalkObserver,
    ) -> Result<Analysis<DocumentAnnotations>, TagboxError> {
        let analysis = analyze_document_with(&self.content, &self.fonts, &self.options, observer);
        let mut warnings = self.load_warnings.clone();
        warnings.extend(analysis.warnings);
        Ok(Analysis::with_warnings(analysis.value, warnings))
    }
}
