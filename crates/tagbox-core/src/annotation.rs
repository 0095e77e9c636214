//! Per-page annotation lists.

use crate::classify::{Tag, TagCategory};
use crate::content::{PageContent, PageId};
use crate::geometry::Rect;

/// Where an annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnnotationSource {
    /// A classified structure element.
    Structure,
    /// An image found in the page resources.
    Image,
}

/// One labeled region in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    pub category: TagCategory,
    pub rect: Rect,
    pub source: AnnotationSource,
}

/// Final annotation list of one page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageAnnotations {
    pub page: PageId,
    pub media_box: Rect,
    /// Structure tags in walk order, then image figures.
    pub annotations: Vec<Annotation>,
}

impl PageAnnotations {
    /// Number of annotations of `category`.
    pub fn count(&self, category: TagCategory) -> usize {
        self.annotations
            .iter()
            .filter(|a| a.category == category)
            .count()
    }
}

/// Annotations of every page of a document, in page order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentAnnotations {
    pub pages: Vec<PageAnnotations>,
}

impl DocumentAnnotations {
    pub fn total(&self) -> usize {
        self.pages.iter().map(|p| p.annotations.len()).sum()
    }
}

/// Merge structure-derived tags and image regions for one page.
///
/// No de-duplication: an image that is also tagged `Figure` in the
/// structure tree appears twice.
pub fn build_page_annotations(page: &PageContent, tags: &[Tag], images: &[Rect]) -> PageAnnotations {
    let mut annotations = Vec::with_capacity(tags.len() + images.len());
    annotations.extend(tags.iter().map(|tag| Annotation {
        category: tag.category,
        rect: tag.rect,
        source: AnnotationSource::Structure,
    }));
    annotations.extend(images.iter().map(|&rect| Annotation {
        category: TagCategory::Figure,
        rect,
        source: AnnotationSource::Image,
    }));
    PageAnnotations {
        page: page.id,
        media_box: page.media_box,
        annotations,
    }
}
