//! Drawable resources of a page and image-region collection.
//!
//! Independently of the structure tree, every raster image reachable from a
//! page's resources is reported as a figure region. Forms nest their own
//! resource dictionaries, so the collection recurses through them.

use crate::geometry::Rect;

/// The XObjects declared by a resource dictionary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceTree {
    pub xobjects: Vec<XObject>,
}

/// One `/XObject` resource entry.
#[derive(Debug, Clone, PartialEq)]
pub enum XObject {
    /// A form XObject with its own resources.
    Form { name: String, resources: ResourceTree },
    /// An image XObject and the page-space rectangle of each place it is
    /// painted at.
    Image { name: String, placements: Vec<Rect> },
}

impl ResourceTree {
    pub fn new(xobjects: Vec<XObject>) -> Self {
        Self { xobjects }
    }

    pub fn is_empty(&self) -> bool {
        self.xobjects.is_empty()
    }
}

/// Every image placement in `tree`, forms expanded in declaration order.
pub fn collect_images(tree: &ResourceTree) -> Vec<Rect> {
    let mut out = Vec::new();
    collect_into(tree, &mut out);
    out
}

fn collect_into(tree: &ResourceTree, out: &mut Vec<Rect>) {
    for xobject in &tree.xobjects {
        match xobject {
            XObject::Form { resources, .. } => collect_into(resources, out),
            XObject::Image { placements, .. } => out.extend_from_slice(placements),
        }
    }
}
