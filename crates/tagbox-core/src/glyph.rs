//! Glyph bounding boxes in page space.
//!
//! The calculator never touches font programs itself. It asks a
//! [`GlyphSource`] (implemented by the PDF backend) for outline bounds in
//! glyph space and composes them with the font matrix and the glyph's
//! rendering matrix.

use crate::content::{FontId, GlyphPlacement};
use crate::geometry::{Matrix, Rect};

/// How a font's glyphs can be measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// Vector outlines addressable by character code (TrueType, CID fonts
    /// with embedded programs).
    Outline,
    /// Type3: glyphs are content streams with a declared `d1` box.
    Type3,
    /// Simple fonts whose outlines are addressed by glyph name through the
    /// font's encoding (Type1 / CFF).
    Simple,
    /// No outline access at all.
    Unsupported,
}

/// Font data the glyph calculator depends on.
///
/// All boxes are in the font's glyph space, before the font matrix is
/// applied. Only [`font_kind`](GlyphSource::font_kind) is required; every
/// lookup defaults to "not available".
pub trait GlyphSource {
    fn font_kind(&self, font: FontId) -> FontKind;

    /// Glyph space to text space. Defaults to the 1/1000 scale of every
    /// font type except Type3.
    fn font_matrix(&self, _font: FontId) -> Matrix {
        Matrix::scale(0.001, 0.001)
    }

    /// Units per em of the outline program, when it isn't 1000.
    fn units_per_em(&self, _font: FontId) -> Option<u16> {
        None
    }

    /// Outline bounds for a character code ([`FontKind::Outline`]).
    fn glyph_outline(&self, _font: FontId, _code: u32) -> Option<Rect> {
        None
    }

    /// Declared `d1` box of a Type3 glyph procedure.
    fn char_proc_bbox(&self, _font: FontId, _code: u32) -> Option<Rect> {
        None
    }

    /// `/FontBBox` of the font.
    fn font_bbox(&self, _font: FontId) -> Option<Rect> {
        None
    }

    /// Glyph name the font's encoding assigns to a code.
    fn glyph_name(&self, _font: FontId, _code: u32) -> Option<String> {
        None
    }

    /// Outline bounds for a named glyph ([`FontKind::Simple`]).
    fn named_glyph_outline(&self, _font: FontId, _name: &str) -> Option<Rect> {
        None
    }

    /// Advance-width by ascent/descent box, used by the metrics fallback.
    fn metrics_box(&self, _font: FontId, _code: u32) -> Option<Rect> {
        None
    }
}

/// Result of measuring one [`GlyphPlacement`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlyphMeasure {
    Bounds(Rect),
    /// Font type unsupported or glyph without an outline.
    Unmeasurable,
    /// The placement carried this many codes instead of one.
    Ambiguous(usize),
}

impl GlyphMeasure {
    pub fn rect(self) -> Option<Rect> {
        match self {
            GlyphMeasure::Bounds(r) => Some(r),
            _ => None,
        }
    }
}

/// Computes page-space glyph boxes from a [`GlyphSource`].
pub struct GlyphBounds<'s> {
    source: &'s dyn GlyphSource,
    metrics_fallback: bool,
}

impl<'s> GlyphBounds<'s> {
    pub fn new(source: &'s dyn GlyphSource) -> Self {
        Self {
            source,
            metrics_fallback: false,
        }
    }

    /// Fall back to [`GlyphSource::metrics_box`] when no outline is available.
    pub fn with_metrics_fallback(mut self, enabled: bool) -> Self {
        self.metrics_fallback = enabled;
        self
    }

    /// Measure a glyph placement. Placements with anything but exactly one
    /// code are reported as ambiguous and never measured.
    pub fn measure(&self, glyph: &GlyphPlacement) -> GlyphMeasure {
        let [code] = glyph.codes.as_slice() else {
            return GlyphMeasure::Ambiguous(glyph.codes.len());
        };
        match self.bounds(&glyph.rendering_matrix, glyph.font, *code) {
            Some(rect) => GlyphMeasure::Bounds(rect),
            None => GlyphMeasure::Unmeasurable,
        }
    }

    /// Page-space box of glyph `code` of `font` painted with `rendering_matrix`.
    pub fn bounds(&self, rendering_matrix: &Matrix, font: FontId, code: u32) -> Option<Rect> {
        let source = self.source;
        let kind = source.font_kind(font);
        let outline = match kind {
            FontKind::Outline => source
                .glyph_outline(font, code)
                .map(|r| self.rescale(font, r)),
            FontKind::Type3 => type3_box(source, font, code),
            FontKind::Simple => source
                .glyph_name(font, code)
                .and_then(|name| source.named_glyph_outline(font, &name))
                .map(|r| self.rescale(font, r)),
            FontKind::Unsupported => None,
        };
        let glyph_box = match outline {
            Some(r) => r,
            None if self.metrics_fallback => source.metrics_box(font, code)?,
            None => {
                tracing::trace!(%font, code, ?kind, "glyph has no outline");
                return None;
            }
        };
        let to_page = source.font_matrix(font).concat(rendering_matrix);
        Some(to_page.transform_rect(&glyph_box))
    }

    /// Bring outline coordinates into the 1000-unit glyph space the font
    /// matrix expects.
    fn rescale(&self, font: FontId, rect: Rect) -> Rect {
        match self.source.units_per_em(font) {
            Some(upem) if upem != 0 && upem != 1000 => {
                Matrix::scale(1000.0 / f64::from(upem), 1000.0 / f64::from(upem))
                    .transform_rect(&rect)
            }
            _ => rect,
        }
    }
}

/// Type3 glyph box clamped to the font box. An all-zero `/FontBBox` means
/// the font box is unknown.
fn type3_box(source: &dyn GlyphSource, font: FontId, code: u32) -> Option<Rect> {
    let glyph = source.char_proc_bbox(font, code)?;
    match source.font_bbox(font) {
        Some(font_box) if !font_box.is_zero() => glyph.intersection(&font_box),
        _ => Some(glyph),
    }
}
