//! tagbox-parse: lopdf backend for the tagbox analysis.
//!
//! Loads PDF documents and turns them into the backend-independent inputs
//! of [`tagbox_core`]: a content stream interpreter producing
//! marked-content groups, font loading with glyph-outline access
//! ([`FontStore`] implements [`tagbox_core::GlyphSource`]), and readers for
//! the structure tree and page resources.

pub mod cmap;
pub mod encoding;
pub mod error;
pub mod font_metrics;
pub mod fonts;
pub mod handler;
pub mod interpreter;
pub mod interpreter_state;
pub mod lopdf_backend;
pub mod marked_content;
mod objects;
pub mod resources;
pub mod struct_tree;
pub mod text_state;
pub mod tokenizer;

pub use error::BackendError;
pub use fonts::{FontStore, LoadedFont};
pub use handler::{ContentHandler, ImageEvent};
pub use lopdf_backend::{LoadedDocument, LopdfDocument};
pub use marked_content::{CollectedContent, MarkedContentCollector};
pub use tagbox_core;
