//! Role classification and the tags it produces.

use std::fmt;

use crate::content::PageId;
use crate::geometry::Rect;

/// Output vocabulary for tagged regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TagCategory {
    Table,
    Figure,
    Text,
}

impl TagCategory {
    /// Lower-case label used in annotation files.
    pub fn label(&self) -> &'static str {
        match self {
            TagCategory::Table => "table",
            TagCategory::Figure => "figure",
            TagCategory::Text => "text",
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying a structure role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Tag(TagCategory),
    /// The element gets no tag of its own; its boxes still count for its
    /// ancestors.
    Suppressed,
}

/// Roles that are containers or inline wrappers rather than blocks.
pub const SUPPRESSED_ROLES: &[&str] = &[
    "LBody",
    "TR",
    "Div",
    "Document",
    "Form",
    "Span",
    "Normal (Web)",
    "Footnote",
    "Link",
];

/// Classify a structure type. Matching is exact and case-sensitive.
pub fn classify(role: &str) -> Classification {
    match role {
        "Table" => Classification::Tag(TagCategory::Table),
        "Figure" => Classification::Tag(TagCategory::Figure),
        r if SUPPRESSED_ROLES.contains(&r) => Classification::Suppressed,
        _ => Classification::Tag(TagCategory::Text),
    }
}

/// A classified region on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    pub category: TagCategory,
    pub rect: Rect,
    pub page: PageId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_and_figure() {
        assert_eq!(classify("Table"), Classification::Tag(TagCategory::Table));
        assert_eq!(classify("Figure"), Classification::Tag(TagCategory::Figure));
    }

    #[test]
    fn every_suppressed_role_is_suppressed() {
        for role in SUPPRESSED_ROLES {
            assert_eq!(classify(role), Classification::Suppressed, "role {role}");
        }
    }

    #[test]
    fn everything_else_is_text() {
        for role in ["P", "H1", "L", "LI", "TD", "TH", "Caption", "Sect", ""] {
            assert_eq!(classify(role), Classification::Tag(TagCategory::Text));
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(classify("table"), Classification::Tag(TagCategory::Text));
        assert_eq!(classify("span"), Classification::Tag(TagCategory::Text));
    }

    #[test]
    fn labels() {
        assert_eq!(TagCategory::Table.label(), "table");
        assert_eq!(TagCategory::Figure.to_string(), "figure");
        assert_eq!(TagCategory::Text.to_string(), "text");
    }
}
