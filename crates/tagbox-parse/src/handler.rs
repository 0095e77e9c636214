//! Content handler callback trait for content stream interpretation.
//!
//! The interpreter reports marked-content boundaries, positioned glyphs and
//! image placements through [`ContentHandler`]; collectors such as
//! [`MarkedContentCollector`](crate::marked_content::MarkedContentCollector)
//! turn those events into the core data model.

use lopdf::ObjectId;
use tagbox_core::{AnalysisWarning, GlyphPlacement, Rect};

/// An image XObject painted by `Do`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEvent {
    /// Resource name the image was invoked by.
    pub name: String,
    /// Object id of the image stream, when it is an indirect object.
    pub object_id: Option<ObjectId>,
    /// Unit square mapped through the CTM.
    pub rect: Rect,
}

/// Callback interface for content stream events.
///
/// Every method has a no-op default so handlers implement only what they
/// need.
pub trait ContentHandler {
    /// `BMC` or `BDC`.
    fn begin_marked_content(&mut self, _tag: &str, _mcid: Option<u32>) {}

    /// `EMC`.
    fn end_marked_content(&mut self) {}

    /// A glyph painted by a text showing operator.
    fn on_glyph(&mut self, _glyph: GlyphPlacement) {}

    fn on_image(&mut self, _event: ImageEvent) {}

    /// A non-fatal problem found while interpreting.
    fn on_warning(&mut self, _warning: AnalysisWarning) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbox_core::{FontId, Matrix, WarningCode};

    struct Noop;
    impl ContentHandler for Noop {}

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ContentHandler for Recorder {
        fn begin_marked_content(&mut self, tag: &str, mcid: Option<u32>) {
            self.events.push(format!("begin {tag} {mcid:?}"));
        }
        fn end_marked_content(&mut self) {
            self.events.push("end".to_string());
        }
        fn on_glyph(&mut self, glyph: GlyphPlacement) {
            self.events.push(format!("glyph {:?}", glyph.codes));
        }
        fn on_warning(&mut self, warning: AnalysisWarning) {
            self.events.push(format!("warning {}", warning.code));
        }
    }

    #[test]
    fn noop_handler_accepts_all_events() {
        let mut handler = Noop;
        handler.begin_marked_content("P", Some(0));
        handler.on_glyph(GlyphPlacement::new(FontId(0), 65, Matrix::identity()));
        handler.on_image(ImageEvent {
            name: "Im0".to_string(),
            object_id: None,
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
        });
        handler.end_marked_content();
    }

    #[test]
    fn handler_is_object_safe() {
        let mut recorder = Recorder::default();
        {
            let handler: &mut dyn ContentHandler = &mut recorder;
            handler.begin_marked_content("Span", None);
            handler.on_glyph(GlyphPlacement::new(FontId(1), 7, Matrix::identity()));
            handler.end_marked_content();
            handler.on_warning(AnalysisWarning::with_code(WarningCode::MissingFont, "no /F9"));
        }
        assert_eq!(
            recorder.events,
            vec!["begin Span None", "glyph [7]", "end", "warning MISSING_FONT"]
        );
    }
}
