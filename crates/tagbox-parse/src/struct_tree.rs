//! Reads the logical structure tree (`/StructTreeRoot`) into [`StructTree`].
//!
//! Every `/K` entry maps onto one of the four [`StructNode`] kinds; nothing
//! here fails. Reference cycles and trees deeper than
//! [`AnalyzeOptions::max_struct_depth`] are cut with a warning.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tagbox_core::{
    AnalysisWarning, AnalyzeOptions, PageId, StructElement, StructNode, StructTree, WarningCode,
};

use crate::objects::{dict_entry, name_entry, resolve, text_entry};

/// Map page object ids to their 0-based position.
pub(crate) fn page_index(doc: &Document) -> HashMap<ObjectId, PageId> {
    doc.get_pages()
        .into_values()
        .enumerate()
        .map(|(index, id)| (id, PageId(index)))
        .collect()
}

/// Read the structure tree of `doc`.
///
/// Returns `None` when the catalog has no `/StructTreeRoot`. A root without
/// `/K` is an empty tree.
pub fn structure_tree(
    doc: &Document,
    options: &AnalyzeOptions,
    warnings: &mut Vec<AnalysisWarning>,
) -> Option<StructTree> {
    let catalog = doc.catalog().ok()?;
    let root = dict_entry(doc, catalog, b"StructTreeRoot")?;
    let mut reader = StructTreeReader {
        doc,
        pages: page_index(doc),
        max_depth: options.max_struct_depth,
        visited: HashSet::new(),
        depth_reported: false,
        warnings,
    };
    let kids = match root.get(b"K") {
        Ok(k) => reader.kids(k, None, 0),
        Err(_) => Vec::new(),
    };
    let tree = StructTree::new(kids);
    tracing::debug!(elements = tree.element_count(), "structure tree read");
    Some(tree)
}

struct StructTreeReader<'a, 'w> {
    doc: &'a Document,
    pages: HashMap<ObjectId, PageId>,
    max_depth: usize,
    /// Indirect elements already read; a repeat means a cycle or a shared node.
    visited: HashSet<ObjectId>,
    depth_reported: bool,
    warnings: &'w mut Vec<AnalysisWarning>,
}

impl StructTreeReader<'_, '_> {
    /// Nodes of a `/K` value. Arrays are flattened into the parent's kids.
    fn kids(&mut self, k: &Object, page: Option<PageId>, depth: usize) -> Vec<StructNode> {
        let doc = self.doc;
        match k {
            Object::Array(items) => items
                .iter()
                .filter_map(|item| self.node(item, page, depth))
                .collect(),
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(Object::Array(items)) => items
                    .iter()
                    .filter_map(|item| self.node(item, page, depth))
                    .collect(),
                _ => self.node(k, page, depth).into_iter().collect(),
            },
            other => self.node(other, page, depth).into_iter().collect(),
        }
    }

    fn node(&mut self, obj: &Object, page: Option<PageId>, depth: usize) -> Option<StructNode> {
        if let Object::Reference(id) = obj {
            if !self.visited.insert(*id) {
                self.warnings.push(AnalysisWarning::with_code(
                    WarningCode::MalformedObject,
                    format!("structure node {} {} R visited twice", id.0, id.1),
                ));
                return None;
            }
        }
        let doc = self.doc;
        match resolve(doc, obj) {
            Object::Integer(n) => Some(match u32::try_from(*n) {
                Ok(mcid) => StructNode::RawId(mcid),
                Err(_) => StructNode::Unrecognized(format!("negative MCID {n}")),
            }),
            Object::Dictionary(dict) => Some(self.dict_node(dict, page, depth)),
            Object::Reference(id) => Some(StructNode::Unrecognized(format!(
                "dangling reference {} {} R",
                id.0, id.1
            ))),
            other => Some(StructNode::Unrecognized(format!(
                "unexpected {} in /K",
                kind_name(other)
            ))),
        }
    }

    fn dict_node(
        &mut self,
        dict: &Dictionary,
        inherited: Option<PageId>,
        depth: usize,
    ) -> StructNode {
        let own_page = self.page_of(dict);
        match name_entry(self.doc, dict, b"Type").as_deref() {
            Some("MCR") => return self.content_ref(dict, own_page.or(inherited)),
            Some("OBJR") => {
                return StructNode::Unrecognized("object reference (OBJR)".to_string());
            }
            _ => {}
        }
        if dict.has(b"MCID") && !dict.has(b"S") {
            return self.content_ref(dict, own_page.or(inherited));
        }
        let Some(role) = name_entry(self.doc, dict, b"S") else {
            return StructNode::Unrecognized("dictionary without /S".to_string());
        };

        let mut element = StructElement::new(role);
        element.page = own_page;
        element.alt_text = text_entry(self.doc, dict, b"Alt");
        element.actual_text = text_entry(self.doc, dict, b"ActualText");
        element.lang = text_entry(self.doc, dict, b"Lang");

        if let Ok(k) = dict.get(b"K") {
            if depth + 1 >= self.max_depth {
                self.report_depth(&element.role);
            } else {
                element.kids = self.kids(k, own_page.or(inherited), depth + 1);
            }
        }
        element.into_node()
    }

    /// A marked-content reference dictionary. Without any page in effect the
    /// id is left for the walker to scope.
    fn content_ref(&self, dict: &Dictionary, page: Option<PageId>) -> StructNode {
        let mcid = match dict.get(b"MCID").map(|obj| resolve(self.doc, obj)) {
            Ok(Object::Integer(n)) => u32::try_from(*n).ok(),
            _ => None,
        };
        match (mcid, page) {
            (Some(mcid), Some(page)) => StructNode::reference(page, mcid),
            (Some(mcid), None) => StructNode::RawId(mcid),
            (None, _) => {
                StructNode::Unrecognized("marked-content reference without MCID".to_string())
            }
        }
    }

    fn page_of(&self, dict: &Dictionary) -> Option<PageId> {
        let id = dict.get(b"Pg").ok()?.as_reference().ok()?;
        self.pages.get(&id).copied()
    }

    fn report_depth(&mut self, role: &str) {
        if self.depth_reported {
            return;
        }
        self.depth_reported = true;
        self.warnings.push(
            AnalysisWarning::with_code(
                WarningCode::DepthLimit,
                format!("structure tree deeper than {} levels truncated", self.max_depth),
            )
            .in_element(format!("element /{role}")),
        );
    }
}

fn kind_name(obj: &Object) -> &'static str {
    match obj {
        Object::Null => "null",
        Object::Boolean(_) => "boolean",
        Object::Integer(_) => "integer",
        Object::Real(_) => "real",
        Object::Name(_) => "name",
        Object::String(..) => "string",
        Object::Array(_) => "array",
        Object::Dictionary(_) => "dictionary",
        Object::Stream(_) => "stream",
        Object::Reference(_) => "reference",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{StringFormat, dictionary};
    use tagbox_core::ContentRef;

    /// A document with `pages` empty pages; returns it with the page ids.
    fn doc_with_pages(pages: usize) -> (Document, Vec<ObjectId>) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let ids: Vec<ObjectId> = (0..pages)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                })
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => ids.iter().map(|id| Object::from(*id)).collect::<Vec<_>>(),
                "Count" => pages as i64,
            }),
        );
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog);
        (doc, ids)
    }

    fn set_root_kids(doc: &mut Document, kids: Object) {
        let root = doc.add_object(dictionary! { "Type" => "StructTreeRoot", "K" => kids });
        let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_object_mut(catalog_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("StructTreeRoot", root);
    }

    fn read(doc: &Document) -> (Option<StructTree>, Vec<AnalysisWarning>) {
        let mut warnings = Vec::new();
        let tree = structure_tree(doc, &AnalyzeOptions::default(), &mut warnings);
        (tree, warnings)
    }

    fn element(node: &StructNode) -> &StructElement {
        match node {
            StructNode::Element(e) => e,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn untagged_document_has_no_tree() {
        let (doc, _) = doc_with_pages(1);
        let (tree, warnings) = read(&doc);
        assert!(tree.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn reads_elements_and_all_kid_kinds() {
        let (mut doc, pages) = doc_with_pages(2);
        let table = doc.add_object(dictionary! {
            "Type" => "StructElem",
            "S" => "Table",
            "Pg" => pages[1],
            "K" => vec![
                dictionary! { "Type" => "MCR", "MCID" => 4 }.into(),
                dictionary! { "Type" => "MCR", "Pg" => pages[0], "MCID" => 1 }.into(),
                2.into(),
                dictionary! { "Type" => "OBJR", "Obj" => pages[0] }.into(),
            ],
        });
        let para = doc.add_object(dictionary! {
            "Type" => "StructElem",
            "S" => "P",
            "K" => 0,
            "Alt" => Object::String(vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69], StringFormat::Literal),
            "Lang" => Object::string_literal("en-US"),
        });
        let document = doc.add_object(dictionary! {
            "Type" => "StructElem",
            "S" => "Document",
            "K" => vec![table.into(), para.into()],
        });
        set_root_kids(&mut doc, document.into());

        let (tree, warnings) = read(&doc);
        let tree = tree.unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(tree.element_count(), 3);

        let document = element(&tree.kids[0]);
        assert_eq!(document.role, "Document");
        assert_eq!(document.page, None);

        let table = element(&document.kids[0]);
        assert_eq!(table.page, Some(PageId(1)));
        assert_eq!(
            table.kids,
            vec![
                StructNode::Reference(ContentRef { page: PageId(1), mcid: 4 }),
                StructNode::Reference(ContentRef { page: PageId(0), mcid: 1 }),
                StructNode::RawId(2),
                StructNode::Unrecognized("object reference (OBJR)".to_string()),
            ]
        );

        let para = element(&document.kids[1]);
        assert_eq!(para.kids, vec![StructNode::RawId(0)]);
        assert_eq!(para.alt_text.as_deref(), Some("Hi"));
        assert_eq!(para.lang.as_deref(), Some("en-US"));
    }

    #[test]
    fn mcr_without_any_page_is_a_raw_id() {
        let (mut doc, _) = doc_with_pages(1);
        let span = doc.add_object(dictionary! {
            "S" => "Span",
            "K" => dictionary! { "MCID" => 9 },
        });
        set_root_kids(&mut doc, vec![span.into()].into());
        let tree = read(&doc).0.unwrap();
        assert_eq!(element(&tree.kids[0]).kids, vec![StructNode::RawId(9)]);
    }

    #[test]
    fn unexpected_kids_are_unrecognized() {
        let (mut doc, _) = doc_with_pages(1);
        let elem = doc.add_object(dictionary! {
            "S" => "P",
            "K" => vec![Object::Boolean(true), dictionary! { "Foo" => 1 }.into(), (-3).into()],
        });
        set_root_kids(&mut doc, elem.into());
        let tree = read(&doc).0.unwrap();
        let kids = &element(&tree.kids[0]).kids;
        assert_eq!(kids.len(), 3);
        assert!(kids.iter().all(|k| matches!(k, StructNode::Unrecognized(_))));
    }

    #[test]
    fn cycles_are_cut_with_a_warning() {
        let (mut doc, _) = doc_with_pages(1);
        let a = doc.new_object_id();
        let b = doc.add_object(dictionary! { "S" => "Sect", "K" => a });
        doc.objects
            .insert(a, Object::Dictionary(dictionary! { "S" => "Div", "K" => b }));
        set_root_kids(&mut doc, a.into());

        let (tree, warnings) = read(&doc);
        let tree = tree.unwrap();
        assert_eq!(tree.element_count(), 2);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::MalformedObject);
    }

    #[test]
    fn deep_trees_are_truncated_once() {
        let (mut doc, _) = doc_with_pages(1);
        let mut kid: Object = 0.into();
        for _ in 0..20 {
            kid = doc.add_object(dictionary! { "S" => "Div", "K" => kid }).into();
        }
        set_root_kids(&mut doc, kid);

        let mut warnings = Vec::new();
        let options = AnalyzeOptions {
            max_struct_depth: 5,
            ..AnalyzeOptions::default()
        };
        let tree = structure_tree(&doc, &options, &mut warnings).unwrap();
        assert_eq!(tree.element_count(), 5);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::DepthLimit);
    }

    #[test]
    fn root_without_kids_is_empty() {
        let (mut doc, _) = doc_with_pages(1);
        let root = doc.add_object(dictionary! { "Type" => "StructTreeRoot" });
        let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_object_mut(catalog_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("StructTreeRoot", root);
        let tree = read(&doc).0.unwrap();
        assert!(tree.kids.is_empty());
    }
}
