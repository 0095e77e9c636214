//! Builds the marked-content group tree of a page from interpreter events.

use std::collections::HashMap;

use lopdf::ObjectId;
use tagbox_core::{
    AnalysisWarning, AnalyzeOptions, ContentItem, GlyphPlacement, ImagePlacement, MarkedContentGroup, Rect,
    WarningCode,
};

use crate::handler::{ContentHandler, ImageEvent};

/// Collects `BMC`/`BDC` ... `EMC` sections with their glyphs and images.
///
/// Content painted outside any marked-content section can't be referenced
/// by the structure tree and is dropped, except that every image placement
/// is still recorded per image object for the resource tree.
///
/// Sections nested deeper than the configured limit are folded into the
/// innermost open group: their content is kept, their own tag and MCID are
/// not.
#[derive(Debug)]
pub struct MarkedContentCollector {
    open: Vec<MarkedContentGroup>,
    groups: Vec<MarkedContentGroup>,
    placements: HashMap<ObjectId, Vec<Rect>>,
    warnings: Vec<AnalysisWarning>,
    max_depth: usize,
    /// Sections opened past `max_depth` and not yet closed.
    folded: usize,
    depth_reported: bool,
}

impl Default for MarkedContentCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkedContentCollector {
    pub fn new() -> Self {
        Self::with_max_depth(AnalyzeOptions::default().max_struct_depth)
    }

    /// Collector that keeps at most `max_depth` nested sections.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            open: Vec::new(),
            groups: Vec::new(),
            placements: HashMap::new(),
            warnings: Vec::new(),
            max_depth: max_depth.max(1),
            folded: 0,
            depth_reported: false,
        }
    }

    /// Depth of currently open sections.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn push_item(&mut self, item: ContentItem) {
        if let Some(group) = self.open.last_mut() {
            group.items.push(item);
        }
    }

    fn close_top(&mut self) {
        let Some(group) = self.open.pop() else {
            return;
        };
        match self.open.last_mut() {
            Some(parent) => parent.items.push(ContentItem::Group(group)),
            None => self.groups.push(group),
        }
    }

    /// Close unterminated sections and return the collected page content.
    pub fn finish(mut self) -> CollectedContent {
        if !self.open.is_empty() {
            self.warnings.push(AnalysisWarning::with_code(
                WarningCode::MalformedObject,
                format!(
                    "{} marked-content section(s) never closed by EMC",
                    self.open.len()
                ),
            ));
        }
        while !self.open.is_empty() {
            self.close_top();
        }
        CollectedContent {
            groups: self.groups,
            image_placements: self.placements,
            warnings: self.warnings,
        }
    }
}

/// Output of [`MarkedContentCollector::finish`].
#[derive(Debug, Default)]
pub struct CollectedContent {
    /// Top-level groups in painting order.
    pub groups: Vec<MarkedContentGroup>,
    /// Where each image object was painted, in painting order.
    pub image_placements: HashMap<ObjectId, Vec<Rect>>,
    pub warnings: Vec<AnalysisWarning>,
}

impl ContentHandler for MarkedContentCollector {
    fn begin_marked_content(&mut self, tag: &str, mcid: Option<u32>) {
        if self.open.len() < self.max_depth {
            self.open.push(MarkedContentGroup::new(tag, mcid));
            return;
        }
        self.folded += 1;
        if !self.depth_reported {
            self.depth_reported = true;
            self.warnings.push(AnalysisWarning::with_code(
                WarningCode::DepthLimit,
                format!(
                    "marked content nested deeper than {}; inner sections merged",
                    self.max_depth
                ),
            ));
        }
    }

    fn end_marked_content(&mut self) {
        if self.folded > 0 {
            self.folded -= 1;
            return;
        }
        if self.open.is_empty() {
            tracing::trace!("EMC without matching BMC/BDC");
            return;
        }
        self.close_top();
    }

    fn on_glyph(&mut self, glyph: GlyphPlacement) {
        self.push_item(ContentItem::Glyph(glyph));
    }

    fn on_image(&mut self, event: ImageEvent) {
        if let Some(id) = event.object_id {
            self.placements.entry(id).or_default().push(event.rect);
        }
        self.push_item(ContentItem::Image(ImagePlacement {
            name: event.name,
            rect: event.rect,
        }));
    }

    fn on_warning(&mut self, warning: AnalysisWarning) {
        self.warnings.push(warning);
    }
}
