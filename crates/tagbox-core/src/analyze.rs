//! Document-level pipeline: images, structure walk, page assembly.

use crate::annotation::{DocumentAnnotations, build_page_annotations};
use crate::content::DocumentContent;
use crate::error::{Analysis, AnalysisWarning, AnalyzeOptions, WarningCode, WarningSink};
use crate::glyph::GlyphSource;
use crate::resources::collect_images;
use crate::walker::{NoopObserver, PageTags, StructureWalker, WalkObserver};

/// Produce the annotations of every page of `doc`.
///
/// Untagged documents are not an error: they yield only the image figures
/// and a [`WarningCode::MissingStructTree`] warning.
pub fn analyze_document(
    doc: &DocumentContent,
    source: &dyn GlyphSource,
    options: &AnalyzeOptions,
) -> Analysis<DocumentAnnotations> {
    analyze_document_with(doc, source, options, &mut NoopObserver)
}

/// [`analyze_document`] with a [`WalkObserver`] attached to the structure walk.
pub fn analyze_document_with(
    doc: &DocumentContent,
    source: &dyn GlyphSource,
    options: &AnalyzeOptions,
    observer: &mut dyn WalkObserver,
) -> Analysis<DocumentAnnotations> {
    let mut sink = WarningSink::new(options.collect_warnings);
    let images: Vec<_> = doc
        .pages
        .iter()
        .map(|page| collect_images(&page.resources))
        .collect();

    let mut tags = PageTags::new(doc.page_count());
    match doc.structure {
        Some(ref tree) => {
            let mut walker = StructureWalker::new(doc, source, options);
            walker.walk_with(tree, &mut tags, observer);
            sink.extend(walker.into_warnings());
        }
        None => sink.push(AnalysisWarning::with_code(
            WarningCode::MissingStructTree,
            "document has no structure tree",
        )),
    }

    let pages = doc
        .pages
        .iter()
        .zip(&images)
        .map(|(page, page_images)| build_page_annotations(page, tags.page(page.id), page_images))
        .collect();
    let value = DocumentAnnotations { pages };
    tracing::debug!(annotations = value.total(), "document analyzed");
    Analysis::with_warnings(value, sink.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TagCategory;
    use crate::content::{ContentItem, FontId, GlyphPlacement, MarkedContentGroup, PageContent, PageId};
    use crate::geometry::{Matrix, Rect};
    use crate::glyph::FontKind;
    use crate::resources::{ResourceTree, XObject};
    use crate::struct_tree::{StructElement, StructNode, StructTree};

    struct NoFonts;

    impl GlyphSource for NoFonts {
        fn font_kind(&self, _font: FontId) -> FontKind {
            FontKind::Unsupported
        }
    }

    struct SquareFont;

    impl GlyphSource for SquareFont {
        fn font_kind(&self, _font: FontId) -> FontKind {
            FontKind::Outline
        }
        fn glyph_outline(&self, _font: FontId, _code: u32) -> Option<Rect> {
            Some(Rect::new(0.0, 0.0, 1000.0, 1000.0))
        }
    }

    fn page_with_image(r: Rect) -> PageContent {
        let mut page = PageContent::new(PageId(0), Rect::new(0.0, 0.0, 200.0, 200.0));
        page.resources = ResourceTree::new(vec![XObject::Image {
            name: "Im0".to_string(),
            placements: vec![r],
        }]);
        page
    }

    #[test]
    fn untagged_document_yields_image_figures_only() {
        let doc = DocumentContent {
            pages: vec![page_with_image(Rect::new(1.0, 1.0, 4.0, 4.0))],
            structure: None,
        };
        let result = analyze_document(&doc, &NoFonts, &AnalyzeOptions::default());
        assert_eq!(result.value.pages.len(), 1);
        let annotations = &result.value.pages[0].annotations;
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].category, TagCategory::Figure);
        assert_eq!(annotations[0].rect, Rect::new(1.0, 1.0, 4.0, 4.0));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::MissingStructTree);
    }

    #[test]
    fn tags_precede_images_on_the_page() {
        let mut page = page_with_image(Rect::new(100.0, 100.0, 150.0, 150.0));
        page.groups = vec![MarkedContentGroup::new("P", Some(0)).with_item(ContentItem::Glyph(
            GlyphPlacement::new(FontId(0), 65, Matrix::new(10.0, 0.0, 0.0, 10.0, 20.0, 30.0)),
        ))];
        let doc = DocumentContent {
            pages: vec![page],
            structure: Some(StructTree::new(vec![
                StructElement::new("P")
                    .on_page(PageId(0))
                    .with_kid(StructNode::RawId(0))
                    .into_node(),
            ])),
        };
        let result = analyze_document(&doc, &SquareFont, &AnalyzeOptions::default());
        assert!(result.is_clean());
        let annotations = &result.value.pages[0].annotations;
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].category, TagCategory::Text);
        assert_eq!(annotations[0].rect, Rect::new(20.0, 30.0, 30.0, 40.0));
        assert_eq!(annotations[1].category, TagCategory::Figure);
    }

    #[test]
    fn warnings_can_be_disabled() {
        let doc = DocumentContent {
            pages: vec![PageContent::new(PageId(0), Rect::new(0.0, 0.0, 1.0, 1.0))],
            structure: None,
        };
        let options = AnalyzeOptions {
            collect_warnings: false,
            ..AnalyzeOptions::default()
        };
        let result = analyze_document(&doc, &NoFonts, &options);
        assert!(result.is_clean());
        assert!(result.value.pages[0].annotations.is_empty());
    }
}
