//! Logical structure tree of a tagged PDF.
//!
//! The tree is a closed set of node kinds ([`StructNode`]); backends map
//! whatever a document's `/K` entries contain onto these four cases and
//! never fail while doing so.

use crate::content::PageId;

/// Root of the structure tree (`/StructTreeRoot`).
///
/// The root itself is not an element: it has no role and is never
/// classified. Only its descendants are.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructTree {
    pub kids: Vec<StructNode>,
}

impl StructTree {
    pub fn new(kids: Vec<StructNode>) -> Self {
        Self { kids }
    }

    /// Number of [`StructElement`]s in the tree.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&StructNode> = self.kids.iter().collect();
        while let Some(node) = stack.pop() {
            if let StructNode::Element(element) = node {
                count += 1;
                stack.extend(element.kids.iter());
            }
        }
        count
    }
}

/// A child entry of a structure element.
#[derive(Debug, Clone, PartialEq)]
pub enum StructNode {
    /// A nested structure element.
    Element(StructElement),
    /// A marked-content reference with an explicit page.
    Reference(ContentRef),
    /// A bare marked-content id, scoped to the page in effect.
    RawId(u32),
    /// Anything else (object references, malformed entries). The payload
    /// describes the entry for logging.
    Unrecognized(String),
}

/// Marked-content reference: content `mcid` on `page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRef {
    pub page: PageId,
    pub mcid: u32,
}

/// A structure element (`/Type /StructElem`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructElement {
    /// Structure type (`/S`), e.g. `Table`, `Figure`, `P`.
    pub role: String,
    /// Page the element declares with `/Pg`.
    pub page: Option<PageId>,
    pub kids: Vec<StructNode>,
    /// Alternate description (`/Alt`).
    pub alt_text: Option<String>,
    /// Replacement text (`/ActualText`).
    pub actual_text: Option<String>,
    /// Language (`/Lang`).
    pub lang: Option<String>,
}

impl StructElement {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            page: None,
            kids: Vec::new(),
            alt_text: None,
            actual_text: None,
            lang: None,
        }
    }

    pub fn on_page(mut self, page: PageId) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_kid(mut self, kid: StructNode) -> Self {
        self.kids.push(kid);
        self
    }

    pub fn with_kids(mut self, kids: impl IntoIterator<Item = StructNode>) -> Self {
        self.kids.extend(kids);
        self
    }

    pub fn into_node(self) -> StructNode {
        StructNode::Element(self)
    }
}

impl Drop for StructElement {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_elements(&mut self.kids, &mut pending);
        while let Some(mut element) = pending.pop() {
            detach_elements(&mut element.kids, &mut pending);
        }
    }
}

/// Move nested elements out of `kids` so they are dropped one at a time.
fn detach_elements(kids: &mut Vec<StructNode>, out: &mut Vec<StructElement>) {
    out.extend(kids.drain(..).filter_map(|kid| match kid {
        StructNode::Element(element) => Some(element),
        _ => None,
    }));
}

impl StructNode {
    pub fn reference(page: PageId, mcid: u32) -> Self {
        StructNode::Reference(ContentRef { page, mcid })
    }

    /// Short human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            StructNode::Element(element) => format!("element /{}", element.role),
            StructNode::Reference(r) => format!("MCR {} on {}", r.mcid, r.page),
            StructNode::RawId(mcid) => format!("MCID {mcid}"),
            StructNode::Unrecognized(desc) => desc.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let el = StructElement::new("P")
            .on_page(PageId(2))
            .with_kid(StructNode::RawId(4))
            .with_kids([StructNode::reference(PageId(3), 1)]);
        assert_eq!(el.role, "P");
        assert_eq!(el.page, Some(PageId(2)));
        assert_eq!(el.kids.len(), 2);
        assert_eq!(
            el.kids[1],
            StructNode::Reference(ContentRef {
                page: PageId(3),
                mcid: 1
            })
        );
    }

    #[test]
    fn element_count_ignores_leaf_kinds() {
        let tree = StructTree::new(vec![
            StructElement::new("Document")
                .with_kids([
                    StructElement::new("P").with_kid(StructNode::RawId(0)).into_node(),
                    StructElement::new("Table")
                        .with_kid(StructElement::new("TR").into_node())
                        .into_node(),
                    StructNode::Unrecognized("OBJR".to_string()),
                ])
                .into_node(),
        ]);
        assert_eq!(tree.element_count(), 4);
    }

    #[test]
    fn describe_nodes() {
        assert_eq!(StructNode::RawId(7).describe(), "MCID 7");
        assert_eq!(
            StructNode::reference(PageId(0), 3).describe(),
            "MCR 3 on page 1"
        );
        assert_eq!(
            StructElement::new("Figure").into_node().describe(),
            "element /Figure"
        );
    }
}
