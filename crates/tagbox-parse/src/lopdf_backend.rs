//! lopdf-based document loading.
//!
//! [`LopdfDocument`] wraps a parsed [`lopdf::Document`] and supplies the
//! inputs the core analysis needs: marked-content groups per page, the
//! structure tree, each page's resource tree, and a [`FontStore`] acting as
//! the glyph source.

use std::sync::LazyLock;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tagbox_core::{
    AnalysisWarning, AnalyzeOptions, DocumentContent, PageContent, PageId, Rect, ResourceTree,
    StructTree, TagboxError, WarningCode,
};

use crate::error::BackendError;
use crate::fonts::FontStore;
use crate::interpreter::Interpreter;
use crate::marked_content::{CollectedContent, MarkedContentCollector};
use crate::objects::{rect_entry, resolve, stream_bytes};
use crate::resources::resource_tree;
use crate::struct_tree::structure_tree;

/// US Letter, used when a page has no usable `/MediaBox`.
const DEFAULT_MEDIA_BOX: Rect = Rect {
    x_min: 0.0,
    y_min: 0.0,
    x_max: 612.0,
    y_max: 792.0,
};

static EMPTY_DICT: LazyLock<Dictionary> = LazyLock::new(Dictionary::new);

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: Document,
    /// Page object ids in document order.
    page_ids: Vec<ObjectId>,
}

/// Everything [`tagbox_core::analyze_document`] needs from one document.
#[derive(Debug)]
pub struct LoadedDocument {
    pub content: DocumentContent,
    /// Fonts referenced by the content, usable as the glyph source.
    pub fonts: FontStore,
    /// Problems met while loading, page-attributed where possible.
    pub warnings: Vec<AnalysisWarning>,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl LopdfDocument {
    /// Parse `bytes` as a PDF.
    ///
    /// # Errors
    ///
    /// [`TagboxError::ResourceLimitExceeded`] when the input is larger than
    /// [`AnalyzeOptions::max_input_bytes`], [`TagboxError::PasswordRequired`]
    /// for encrypted files, and [`BackendError::Parse`] for anything lopdf
    /// can't read.
    pub fn open(bytes: &[u8], options: &AnalyzeOptions) -> Result<Self, BackendError> {
        if let Some(limit) = options.max_input_bytes {
            if bytes.len() > limit {
                return Err(BackendError::Core(TagboxError::ResourceLimitExceeded {
                    limit_name: "max_input_bytes".to_string(),
                    limit_value: limit,
                    actual_value: bytes.len(),
                }));
            }
        }
        let inner = Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        if inner.is_encrypted() {
            return Err(BackendError::Core(TagboxError::PasswordRequired));
        }
        let page_ids = inner.get_pages().into_values().collect();
        Ok(Self { inner, page_ids })
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Whether the catalog declares a `/StructTreeRoot`.
    pub fn has_structure_tree(&self) -> bool {
        self.inner
            .catalog()
            .map(|catalog| catalog.has(b"StructTreeRoot"))
            .unwrap_or(false)
    }

    fn page_object(&self, page: PageId) -> Result<ObjectId, BackendError> {
        self.page_ids.get(page.index()).copied().ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {} out of range (0..{})",
                page.index(),
                self.page_ids.len()
            ))
        })
    }

    fn page_dict(&self, page: PageId) -> Result<&Dictionary, BackendError> {
        let id = self.page_object(page)?;
        self.inner
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))
    }

    /// The page's `/MediaBox`, inherited through the page tree.
    pub fn media_box(&self, page: PageId) -> Result<Rect, BackendError> {
        let id = self.page_object(page)?;
        let owner = resolve_inherited(&self.inner, id, b"MediaBox")?.ok_or_else(|| {
            BackendError::Parse("MediaBox not found on page or ancestors".to_string())
        })?;
        rect_entry(&self.inner, owner, b"MediaBox")
            .ok_or_else(|| BackendError::Parse("MediaBox is not a 4-number array".to_string()))
    }

    /// The page's `/Resources`, inherited through the page tree.
    fn page_resources(&self, page: PageId) -> Result<&Dictionary, BackendError> {
        let id = self.page_object(page)?;
        let Some(owner) = resolve_inherited(&self.inner, id, b"Resources")? else {
            return Ok(&EMPTY_DICT);
        };
        owner
            .get(b"Resources")
            .map(|obj| resolve(&self.inner, obj))
            .and_then(Object::as_dict)
            .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string()))
    }

    /// Interpret the page's content streams into marked-content groups.
    ///
    /// Fonts are loaded into `fonts` on first use.
    ///
    /// # Errors
    ///
    /// Fails when the page or its `/Contents` can't be read or tokenized.
    pub fn extract_marked_content(
        &self,
        page: PageId,
        fonts: &mut FontStore,
        options: &AnalyzeOptions,
    ) -> Result<CollectedContent, BackendError> {
        let content = page_content_bytes(&self.inner, self.page_dict(page)?)?;
        let resources = self.page_resources(page)?;
        let mut collector = MarkedContentCollector::with_max_depth(options.max_struct_depth);
        Interpreter::new(&self.inner, fonts, options, page).run(
            &content,
            resources,
            &mut collector,
        )?;
        let mut collected = collector.finish();
        for warning in &mut collected.warnings {
            if warning.page.is_none() {
                warning.page = Some(page.index());
            }
        }
        tracing::debug!(
            page = %page,
            groups = collected.groups.len(),
            images = collected.image_placements.len(),
            "page content interpreted"
        );
        Ok(collected)
    }

    /// Read the logical structure tree, `None` for untagged documents.
    pub fn structure_tree(
        &self,
        options: &AnalyzeOptions,
        warnings: &mut Vec<AnalysisWarning>,
    ) -> Option<StructTree> {
        structure_tree(&self.inner, options, warnings)
    }

    /// Drawable resources of `page`, with image bounds taken from the
    /// placements found while interpreting it.
    pub fn resource_tree(
        &self,
        page: PageId,
        collected: &CollectedContent,
        options: &AnalyzeOptions,
        warnings: &mut Vec<AnalysisWarning>,
    ) -> Result<ResourceTree, BackendError> {
        let resources = self.page_resources(page)?;
        let mut page_warnings = Vec::new();
        let tree = resource_tree(
            &self.inner,
            resources,
            &collected.image_placements,
            options,
            &mut page_warnings,
        );
        warnings.extend(page_warnings.into_iter().map(|w| w.on_page(page.index())));
        Ok(tree)
    }

    /// Load every page plus the structure tree.
    ///
    /// Never fails: a page whose content can't be read becomes an empty page
    /// and a warning.
    pub fn load(&self, options: &AnalyzeOptions) -> LoadedDocument {
        let mut fonts = FontStore::new();
        let mut warnings = Vec::new();
        let mut pages = Vec::with_capacity(self.page_count());

        for index in 0..self.page_count() {
            let id = PageId(index);
            let media_box = self.media_box(id).unwrap_or_else(|e| {
                warnings.push(page_warning(id, format!("{e}; assuming US Letter")));
                DEFAULT_MEDIA_BOX
            });
            let mut page = PageContent::new(id, media_box);
            let collected = match self.extract_marked_content(id, &mut fonts, options) {
                Ok(collected) => collected,
                Err(e) => {
                    warnings.push(page_warning(id, format!("page content unreadable: {e}")));
                    CollectedContent::default()
                }
            };
            match self.resource_tree(id, &collected, options, &mut warnings) {
                Ok(tree) => page.resources = tree,
                Err(e) => warnings.push(page_warning(id, e.to_string())),
            }
            let CollectedContent {
                groups,
                warnings: page_warnings,
                ..
            } = collected;
            page.groups = groups;
            warnings.extend(page_warnings);
            pages.push(page);
        }

        let structure = self.structure_tree(options, &mut warnings);
        LoadedDocument {
            content: DocumentContent { pages, structure },
            fonts,
            warnings,
        }
    }
}

fn page_warning(page: PageId, description: String) -> AnalysisWarning {
    AnalysisWarning::with_code(WarningCode::MalformedObject, description).on_page(page.index())
}

/// Find the page-tree node that carries `key`, walking `/Parent` links up
/// from the page.
///
/// Returns `None` if no node on the path has the key.
fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Dictionary>, BackendError> {
    let mut current_id = page_id;
    // Bounded to survive /Parent cycles.
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page tree node: {e}")))?;
        if dict.has(key) {
            return Ok(Some(dict));
        }
        match dict.get(b"Parent") {
            Ok(parent) => {
                current_id = parent
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// Concatenated `/Contents` of a page, one stream or an array of them.
fn page_content_bytes(doc: &Document, page: &Dictionary) -> Result<Vec<u8>, BackendError> {
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };
    match resolve(doc, contents) {
        Object::Stream(stream) => stream_bytes(stream),
        Object::Array(items) => {
            let mut content = Vec::new();
            for item in items {
                let stream = resolve(doc, item).as_stream().map_err(|e| {
                    BackendError::Parse(format!("/Contents array item is not a stream: {e}"))
                })?;
                let bytes = stream_bytes(stream)?;
                if !content.is_empty() {
                    content.push(b'\n');
                }
                content.extend_from_slice(&bytes);
            }
            Ok(content)
        }
        _ => Err(BackendError::Parse(
            "/Contents is not a stream or array".to_string(),
        )),
    }
}
