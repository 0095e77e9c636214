//! Page content as seen through marked-content groups.
//!
//! A backend interprets each page's content stream and hands the core a
//! tree of [`MarkedContentGroup`]s. Content drawn outside of any group is
//! not represented: nothing in the structure tree can point at it.

use std::fmt;

use crate::geometry::{Matrix, Rect};
use crate::resources::ResourceTree;
use crate::struct_tree::StructTree;

/// Zero-based position of a page in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageId(pub usize);

impl PageId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Humans count pages from one.
        write!(f, "page {}", self.0 + 1)
    }
}

/// Handle to a font loaded by the backend.
///
/// Issued once per distinct font object, so equal ids mean the same font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontId(pub usize);

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font #{}", self.0)
    }
}

/// One glyph as painted by a text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPlacement {
    pub font: FontId,
    /// Character codes for this glyph. Normally exactly one; anything else
    /// makes the glyph unmeasurable.
    pub codes: Vec<u32>,
    /// Text rendering matrix composed with the CTM at the time of painting.
    pub rendering_matrix: Matrix,
    /// Best-effort Unicode value, when the font declares one.
    pub unicode: Option<String>,
}

impl GlyphPlacement {
    pub fn new(font: FontId, code: u32, rendering_matrix: Matrix) -> Self {
        Self {
            font,
            codes: vec![code],
            rendering_matrix,
            unicode: None,
        }
    }

    pub fn with_unicode(mut self, unicode: impl Into<String>) -> Self {
        self.unicode = Some(unicode.into());
        self
    }
}

/// An image XObject painted with `Do` inside a marked-content group.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// Resource name the image was invoked by (without the leading `/`).
    pub name: String,
    /// The unit square mapped through the CTM in effect at `Do`.
    pub rect: Rect,
}

/// Anything a marked-content group can contain.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Glyph(GlyphPlacement),
    Group(MarkedContentGroup),
    Image(ImagePlacement),
}

/// A `BMC`/`BDC` ... `EMC` section of a content stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkedContentGroup {
    /// Tag operand of `BMC`/`BDC` (e.g. `P`, `Span`, `Artifact`).
    pub tag: String,
    /// `/MCID` from the property list, unique within the page.
    pub mcid: Option<u32>,
    pub items: Vec<ContentItem>,
}

impl MarkedContentGroup {
    pub fn new(tag: impl Into<String>, mcid: Option<u32>) -> Self {
        Self {
            tag: tag.into(),
            mcid,
            items: Vec::new(),
        }
    }

    /// Builder-style append, mostly for constructing fixtures.
    pub fn with_item(mut self, item: ContentItem) -> Self {
        self.items.push(item);
        self
    }

    /// Concatenated Unicode text of all glyphs, depth first.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<&ContentItem> = self.items.iter().rev().collect();
        while let Some(item) = stack.pop() {
            match item {
                ContentItem::Glyph(glyph) => {
                    if let Some(ref text) = glyph.unicode {
                        out.push_str(text);
                    }
                }
                ContentItem::Group(group) => stack.extend(group.items.iter().rev()),
                ContentItem::Image(_) => {}
            }
        }
        out
    }
}

// Group trees nest as deep as the content stream does; tear them down
// with an explicit stack instead of the recursive drop glue.
impl Drop for MarkedContentGroup {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_groups(&mut self.items, &mut pending);
        while let Some(mut group) = pending.pop() {
            detach_groups(&mut group.items, &mut pending);
        }
    }
}

fn detach_groups(items: &mut Vec<ContentItem>, out: &mut Vec<MarkedContentGroup>) {
    out.extend(items.drain(..).filter_map(|item| match item {
        ContentItem::Group(group) => Some(group),
        _ => None,
    }));
}

/// Everything the analysis needs from a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub id: PageId,
    pub media_box: Rect,
    /// Top-level marked-content groups in painting order.
    pub groups: Vec<MarkedContentGroup>,
    /// Drawable resources reachable from the page's `/Resources`.
    pub resources: ResourceTree,
}

impl PageContent {
    pub fn new(id: PageId, media_box: Rect) -> Self {
        Self {
            id,
            media_box,
            groups: Vec::new(),
            resources: ResourceTree::default(),
        }
    }
}

/// A loaded document: its pages plus the logical structure tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentContent {
    pub pages: Vec<PageContent>,
    /// `None` for untagged documents.
    pub structure: Option<StructTree>,
}

impl DocumentContent {
    pub fn page(&self, id: PageId) -> Option<&PageContent> {
        self.pages.get(id.index())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
