//! Builds a page's [`ResourceTree`] from its `/Resources` dictionary.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tagbox_core::{AnalysisWarning, AnalyzeOptions, Rect, ResourceTree, WarningCode, XObject};

use crate::objects::{dict_entry, name_entry, number_entry, resolve};

/// Drawable XObjects reachable from `resources`, forms expanded.
///
/// Image regions come from `placements`, one page-space rectangle per time
/// the image was painted. Images that are declared but never painted report
/// their pixel size, `[0, 0, /Width, /Height]`.
pub fn resource_tree(
    doc: &Document,
    resources: &Dictionary,
    placements: &HashMap<ObjectId, Vec<Rect>>,
    options: &AnalyzeOptions,
    warnings: &mut Vec<AnalysisWarning>,
) -> ResourceTree {
    let mut builder = ResourceTreeBuilder {
        doc,
        placements,
        max_depth: options.max_recursion_depth,
        path: HashSet::new(),
        warnings,
    };
    builder.build(resources, 0)
}

struct ResourceTreeBuilder<'a, 'w> {
    doc: &'a Document,
    placements: &'a HashMap<ObjectId, Vec<Rect>>,
    max_depth: usize,
    /// Forms on the current expansion path.
    path: HashSet<ObjectId>,
    warnings: &'w mut Vec<AnalysisWarning>,
}

impl ResourceTreeBuilder<'_, '_> {
    fn build(&mut self, resources: &Dictionary, depth: usize) -> ResourceTree {
        let Some(xobjects) = dict_entry(self.doc, resources, b"XObject") else {
            return ResourceTree::default();
        };
        let mut out = Vec::new();
        for (key, value) in xobjects.iter() {
            let name = String::from_utf8_lossy(key).into_owned();
            if let Some(xobject) = self.xobject(name, value, depth) {
                out.push(xobject);
            }
        }
        ResourceTree::new(out)
    }

    fn xobject(&mut self, name: String, value: &Object, depth: usize) -> Option<XObject> {
        let id = value.as_reference().ok();
        let Ok(stream) = resolve(self.doc, value).as_stream() else {
            tracing::debug!(name = %name, "XObject entry is not a stream");
            return None;
        };
        let dict = &stream.dict;
        match name_entry(self.doc, dict, b"Subtype").as_deref() {
            Some("Image") => {
                let placements = id
                    .and_then(|id| self.placements.get(&id))
                    .filter(|placed| !placed.is_empty())
                    .cloned()
                    .unwrap_or_else(|| vec![self.pixel_bounds(dict)]);
                Some(XObject::Image { name, placements })
            }
            Some("Form") => {
                if depth + 1 > self.max_depth {
                    self.warnings.push(AnalysisWarning::with_code(
                        WarningCode::DepthLimit,
                        format!(
                            "resources of Form XObject /{name} nested deeper than {}",
                            self.max_depth
                        ),
                    ));
                    return None;
                }
                if let Some(id) = id {
                    if !self.path.insert(id) {
                        self.warnings.push(AnalysisWarning::with_code(
                            WarningCode::MalformedObject,
                            format!("Form XObject /{name} contains itself"),
                        ));
                        return None;
                    }
                }
                let resources = match dict_entry(self.doc, dict, b"Resources") {
                    Some(inner) => self.build(inner, depth + 1),
                    None => ResourceTree::default(),
                };
                if let Some(id) = id {
                    self.path.remove(&id);
                }
                Some(XObject::Form { name, resources })
            }
            other => {
                tracing::trace!(name = %name, subtype = ?other, "XObject ignored");
                None
            }
        }
    }

    fn pixel_bounds(&self, dict: &Dictionary) -> Rect {
        let width = number_entry(self.doc, dict, b"Width").unwrap_or(0.0);
        let height = number_entry(self.doc, dict, b"Height").unwrap_or(0.0);
        Rect::new(0.0, 0.0, width, height)
    }
}
