//! Per-page lookup from marked-content id to its group.

use std::collections::HashMap;

use crate::content::{ContentItem, MarkedContentGroup};

/// Maps MCIDs to the marked-content groups of one page.
///
/// Nested groups are indexed under their own ids, in content-stream order.
/// When an id occurs more than once the group seen last wins. Groups without
/// an id are not indexed but their nested groups are.
#[derive(Debug, Clone, Default)]
pub struct MarkedContentIndex<'a> {
    groups: HashMap<u32, &'a MarkedContentGroup>,
}

impl<'a> MarkedContentIndex<'a> {
    pub fn build(groups: &'a [MarkedContentGroup]) -> Self {
        let mut index = HashMap::new();
        // Pre-order over the group tree: push children in reverse so they
        // pop in stream order.
        let mut stack: Vec<&'a MarkedContentGroup> = groups.iter().rev().collect();
        while let Some(group) = stack.pop() {
            if let Some(mcid) = group.mcid {
                index.insert(mcid, group);
            }
            for item in group.items.iter().rev() {
                if let ContentItem::Group(nested) = item {
                    stack.push(nested);
                }
            }
        }
        Self { groups: index }
    }

    pub fn get(&self, mcid: u32) -> Option<&'a MarkedContentGroup> {
        self.groups.get(&mcid).copied()
    }

    pub fn contains(&self, mcid: u32) -> bool {
        self.groups.contains_key(&mcid)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Indexed ids in ascending order.
    pub fn mcids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.groups.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{FontId, GlyphPlacement};
    use crate::geometry::Matrix;

    fn glyph(code: u32) -> ContentItem {
        ContentItem::Glyph(GlyphPlacement::new(FontId(0), code, Matrix::identity()))
    }

    #[test]
    fn indexes_top_level_groups() {
        let groups = vec![
            MarkedContentGroup::new("P", Some(0)).with_item(glyph(1)),
            MarkedContentGroup::new("P", Some(1)).with_item(glyph(2)),
        ];
        let index = MarkedContentIndex::build(&groups);
        assert_eq!(index.len(), 2);
        assert_eq!(index.mcids(), vec![0, 1]);
        assert_eq!(index.get(1).map(|g| g.items.len()), Some(1));
        assert!(index.get(2).is_none());
    }

    #[test]
    fn indexes_nested_groups_under_their_own_ids() {
        let groups = vec![
            MarkedContentGroup::new("P", Some(0)).with_item(ContentItem::Group(
                MarkedContentGroup::new("Span", Some(5))
                    .with_item(ContentItem::Group(MarkedContentGroup::new("Span", Some(6)))),
            )),
        ];
        let index = MarkedContentIndex::build(&groups);
        assert_eq!(index.mcids(), vec![0, 5, 6]);
        assert_eq!(index.get(5).map(|g| g.tag.as_str()), Some("Span"));
    }

    #[test]
    fn groups_without_id_are_transparent() {
        let groups = vec![
            MarkedContentGroup::new("Artifact", None).with_item(ContentItem::Group(
                MarkedContentGroup::new("P", Some(3)).with_item(glyph(9)),
            )),
        ];
        let index = MarkedContentIndex::build(&groups);
        assert_eq!(index.mcids(), vec![3]);
    }

    #[test]
    fn duplicate_ids_last_write_wins() {
        let groups = vec![
            MarkedContentGroup::new("First", Some(2)),
            MarkedContentGroup::new("Second", Some(2)),
        ];
        let index = MarkedContentIndex::build(&groups);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(2).map(|g| g.tag.as_str()), Some("Second"));
    }

    #[test]
    fn nested_duplicate_overrides_its_parent() {
        let groups = vec![
            MarkedContentGroup::new("Outer", Some(1))
                .with_item(ContentItem::Group(MarkedContentGroup::new("Inner", Some(1)))),
        ];
        let index = MarkedContentIndex::build(&groups);
        assert_eq!(index.get(1).map(|g| g.tag.as_str()), Some("Inner"));
    }

    #[test]
    fn empty_page_builds_empty_index() {
        let index = MarkedContentIndex::build(&[]);
        assert!(index.is_empty());
        assert!(!index.contains(0));
    }
}
