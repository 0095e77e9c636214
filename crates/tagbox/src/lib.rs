//! tagbox: labeled layout regions from tagged PDF documents.
//!
//! Opens a PDF, correlates its logical structure tree with the content on
//! each page, and reports every table, figure and text region as a
//! page-space rectangle. Results can be written as Pascal-VOC style XML
//! ([`voc`]) or, with the `serde` feature, as JSON.
//!
//! # Architecture
//!
//! - **tagbox-core**: backend-independent correlation and aggregation
//! - **tagbox-parse**: lopdf backend, content stream interpreter, fonts
//! - **tagbox** (this crate): public API tying them together
//!
//! ```ignore
//! let pdf = tagbox::Pdf::open_file("paper.pdf", None)?;
//! let analysis = pdf.analyze()?;
//! for page in &analysis.value.pages {
//!     println!("{}: {} regions", page.page, page.annotations.len());
//! }
//! ```

#[cfg(feature = "serde")]
pub mod json;
mod pdf;
pub mod voc;

pub use pdf::Pdf;
pub use voc::{AnnotationOptions, Coords, file_name, page_record};

pub use tagbox_core;
pub use tagbox_core::{
    Analysis, AnalysisWarning, AnalyzeOptions, Annotation, AnnotationSource, DocumentAnnotations,
    PageAnnotations, PageId, Rect, TagCategory, TagboxError, WalkObserver, WarningCode,
};
pub use tagbox_parse;
