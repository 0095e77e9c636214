//! Structure-tree traversal and bottom-up box aggregation.
//!
//! The walker visits every structure element, resolves marked-content
//! references against the per-page [`MarkedContentIndex`]es, and unions
//! glyph and image boxes upward per page. Each element with content is
//! classified on the way back up; non-suppressed elements become [`Tag`]s.
//!
//! Traversal uses an explicit stack of frames, so arbitrarily deep trees
//! cannot overflow the native stack.

use std::collections::BTreeMap;

use crate::classify::{Classification, Tag, classify};
use crate::content::{ContentItem, DocumentContent, MarkedContentGroup, PageId};
use crate::error::{AnalysisWarning, AnalyzeOptions, WarningCode, WarningSink};
use crate::geometry::Rect;
use crate::glyph::{GlyphBounds, GlyphMeasure, GlyphSource};
use crate::mcid_index::MarkedContentIndex;
use crate::struct_tree::{StructElement, StructNode, StructTree};

/// Union of content boxes per page.
pub type PageBoxes = BTreeMap<PageId, Rect>;

/// Union `rect` into the entry for `page`.
pub fn merge_box(boxes: &mut PageBoxes, page: PageId, rect: Rect) {
    boxes
        .entry(page)
        .and_modify(|existing| *existing = existing.union(&rect))
        .or_insert(rect);
}

/// Union every entry of `from` into `into`.
pub fn merge_boxes(into: &mut PageBoxes, from: &PageBoxes) {
    for (&page, rect) in from {
        merge_box(into, page, *rect);
    }
}

/// Tags accumulated during a walk, one list per page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTags {
    pages: Vec<Vec<Tag>>,
}

impl PageTags {
    pub fn new(page_count: usize) -> Self {
        Self {
            pages: vec![Vec::new(); page_count],
        }
    }

    pub fn push(&mut self, tag: Tag) {
        let index = tag.page.index();
        if index >= self.pages.len() {
            self.pages.resize_with(index + 1, Vec::new);
        }
        self.pages[index].push(tag);
    }

    /// Tags of `page` in the order they were produced.
    pub fn page(&self, page: PageId) -> &[Tag] {
        self.pages.get(page.index()).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(Vec::is_empty)
    }

    /// Consume into per-page lists indexed by page number.
    pub fn into_pages(self) -> Vec<Vec<Tag>> {
        self.pages
    }
}

/// Callbacks fired during a walk.
///
/// All methods have default no-op implementations.
pub trait WalkObserver {
    /// Called when the walker descends into an element.
    fn element_entered(&mut self, _depth: usize, _element: &StructElement) {}

    /// Called when all of an element's children have been visited.
    ///
    /// `classification` is `None` when the element had no content.
    fn element_finished(
        &mut self,
        _depth: usize,
        _element: &StructElement,
        _boxes: &PageBoxes,
        _classification: Option<Classification>,
    ) {
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl WalkObserver for NoopObserver {}

/// One element (or the root) being visited.
struct Frame<'t> {
    element: Option<&'t StructElement>,
    kids: &'t [StructNode],
    next: usize,
    /// Page that bare MCIDs resolve against. References overwrite it for
    /// the siblings that follow them.
    ambient: Option<PageId>,
    boxes: PageBoxes,
}

impl<'t> Frame<'t> {
    fn new(element: Option<&'t StructElement>, kids: &'t [StructNode], ambient: Option<PageId>) -> Self {
        Self {
            element,
            kids,
            next: 0,
            ambient,
            boxes: PageBoxes::new(),
        }
    }
}

/// Correlates structure nodes with page content.
pub struct StructureWalker<'d> {
    indexes: Vec<MarkedContentIndex<'d>>,
    glyphs: GlyphBounds<'d>,
    warnings: WarningSink,
}

impl<'d> StructureWalker<'d> {
    /// Index every page of `doc` and prepare glyph measurement.
    pub fn new(
        doc: &'d DocumentContent,
        source: &'d dyn GlyphSource,
        options: &AnalyzeOptions,
    ) -> Self {
        Self {
            indexes: doc
                .pages
                .iter()
                .map(|page| MarkedContentIndex::build(&page.groups))
                .collect(),
            glyphs: GlyphBounds::new(source).with_metrics_fallback(options.metrics_fallback),
            warnings: WarningSink::new(options.collect_warnings),
        }
    }

    /// Walk the whole tree, appending tags to `tags`. Returns the per-page
    /// union of everything the tree covers.
    pub fn walk(&mut self, tree: &StructTree, tags: &mut PageTags) -> PageBoxes {
        self.walk_with(tree, tags, &mut NoopObserver)
    }

    /// [`walk`](Self::walk) with an observer.
    pub fn walk_with(
        &mut self,
        tree: &StructTree,
        tags: &mut PageTags,
        observer: &mut dyn WalkObserver,
    ) -> PageBoxes {
        self.run(Frame::new(None, &tree.kids, None), tags, observer)
    }

    /// Visit a single node with the given ambient page.
    ///
    /// Elements are classified (and their descendants too); leaf nodes are
    /// resolved and returned without producing tags.
    pub fn visit(
        &mut self,
        node: &StructNode,
        ambient: Option<PageId>,
        tags: &mut PageTags,
        observer: &mut dyn WalkObserver,
    ) -> PageBoxes {
        self.run(
            Frame::new(None, std::slice::from_ref(node), ambient),
            tags,
            observer,
        )
    }

    fn run<'t>(
        &mut self,
        root: Frame<'t>,
        tags: &mut PageTags,
        observer: &mut dyn WalkObserver,
    ) -> PageBoxes {
        let mut stack = vec![root];
        loop {
            let Some(frame) = stack.last_mut() else {
                return PageBoxes::new();
            };
            let kids = frame.kids;
            if let Some(kid) = kids.get(frame.next) {
                frame.next += 1;
                match kid {
                    StructNode::Element(element) => {
                        let ambient = element.page.or(frame.ambient);
                        observer.element_entered(stack.len(), element);
                        stack.push(Frame::new(Some(element), &element.kids, ambient));
                    }
                    StructNode::Reference(r) => {
                        frame.ambient = Some(r.page);
                        if let Some(rect) = self.resolve_content(Some(r.mcid), r.page) {
                            merge_box(&mut frame.boxes, r.page, rect);
                        }
                    }
                    StructNode::RawId(mcid) => match frame.ambient {
                        Some(page) => {
                            if let Some(rect) = self.resolve_content(Some(*mcid), page) {
                                merge_box(&mut frame.boxes, page, rect);
                            }
                        }
                        None => {
                            let mut warning = AnalysisWarning::with_code(
                                WarningCode::UnresolvedMcid,
                                format!("MCID {mcid} has no page to resolve against"),
                            );
                            if let Some(element) = frame.element {
                                warning = warning.in_element(format!("element /{}", element.role));
                            }
                            self.warnings.push(warning);
                        }
                    },
                    StructNode::Unrecognized(desc) => {
                        self.warnings.push(AnalysisWarning::with_code(
                            WarningCode::UnrecognizedNode,
                            format!("skipped structure kid: {desc}"),
                        ));
                    }
                }
                continue;
            }

            let Some(done) = stack.pop() else {
                return PageBoxes::new();
            };
            let depth = stack.len();
            if let Some(element) = done.element {
                let classification = if done.boxes.is_empty() {
                    None
                } else {
                    Some(classify(&element.role))
                };
                if let Some(Classification::Tag(category)) = classification {
                    for (&page, &rect) in &done.boxes {
                        tags.push(Tag {
                            category,
                            rect,
                            page,
                        });
                    }
                }
                tracing::debug!(
                    role = %element.role,
                    pages = done.boxes.len(),
                    ?classification,
                    "element finished"
                );
                observer.element_finished(depth, element, &done.boxes, classification);
            }
            match stack.last_mut() {
                Some(parent) => merge_boxes(&mut parent.boxes, &done.boxes),
                None => return done.boxes,
            }
        }
    }

    /// Bounding box of the content with id `mcid` on `page`.
    ///
    /// Glyphs, images and nested groups all contribute. Nested groups are
    /// looked up by their own id, or read directly when they have none.
    pub fn resolve_content(&mut self, mcid: Option<u32>, page: PageId) -> Option<Rect> {
        let mcid = mcid?;
        let index = self.indexes.get(page.index())?;
        let Some(group) = index.get(mcid) else {
            self.warnings.push(
                AnalysisWarning::with_code(
                    WarningCode::UnresolvedMcid,
                    format!("MCID {mcid} not found"),
                )
                .on_page(page.index()),
            );
            return None;
        };

        let mut rect: Option<Rect> = None;
        let mut pending: Vec<&'d MarkedContentGroup> = vec![group];
        while let Some(group) = pending.pop() {
            for item in &group.items {
                match item {
                    ContentItem::Glyph(glyph) => match self.glyphs.measure(glyph) {
                        GlyphMeasure::Bounds(r) => rect = Some(union(rect, r)),
                        GlyphMeasure::Unmeasurable => {}
                        GlyphMeasure::Ambiguous(count) => {
                            self.warnings.push(
                                AnalysisWarning::with_code(
                                    WarningCode::AmbiguousGlyph,
                                    format!(
                                        "glyph with {count} character codes in MCID {mcid} skipped"
                                    ),
                                )
                                .on_page(page.index()),
                            );
                        }
                    },
                    ContentItem::Image(image) => rect = Some(union(rect, image.rect)),
                    ContentItem::Group(nested) => match nested.mcid {
                        Some(id) => match index.get(id) {
                            Some(found) => pending.push(found),
                            None => pending.push(nested),
                        },
                        None => pending.push(nested),
                    },
                }
            }
        }
        rect
    }

    /// Warnings collected so far.
    pub fn into_warnings(self) -> Vec<AnalysisWarning> {
        self.warnings.into_vec()
    }
}

fn union(acc: Option<Rect>, rect: Rect) -> Rect {
    match acc {
        Some(existing) => existing.union(&rect),
        None => rect,
    }
}
