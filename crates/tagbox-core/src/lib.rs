//! tagbox-core: backend-independent structure-to-content correlation.
//!
//! Given the marked-content groups of every page, a logical structure tree
//! and access to glyph outlines, this crate computes the page-space bounding
//! box of every structure element and classifies it as a table, figure or
//! text region. Raster images found in the page resources are reported as
//! additional figure regions.
//!
//! PDF parsing lives in `tagbox-parse`; this crate only sees the data types
//! in [`content`], [`struct_tree`] and [`resources`] plus the
//! [`GlyphSource`] trait.

pub mod analyze;
pub mod annotation;
pub mod classify;
pub mod content;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod mcid_index;
pub mod resources;
pub mod struct_tree;
pub mod walker;

pub use analyze::{analyze_document, analyze_document_with};
pub use annotation::{
    Annotation, AnnotationSource, DocumentAnnotations, PageAnnotations, build_page_annotations,
};
pub use classify::{Classification, SUPPRESSED_ROLES, Tag, TagCategory, classify};
pub use content::{
    ContentItem, DocumentContent, FontId, GlyphPlacement, ImagePlacement, MarkedContentGroup,
    PageContent, PageId,
};
pub use error::{Analysis, AnalysisWarning, AnalyzeOptions, TagboxError, WarningCode, WarningSink};
pub use geometry::{Matrix, Rect, union_opt};
pub use glyph::{FontKind, GlyphBounds, GlyphMeasure, GlyphSource};
pub use mcid_index::MarkedContentIndex;
pub use resources::{ResourceTree, XObject, collect_images};
pub use struct_tree::{ContentRef, StructElement, StructNode, StructTree};
pub use walker::{NoopObserver, PageBoxes, PageTags, StructureWalker, WalkObserver};
