//! Pascal-VOC style annotation records.
//!
//! One XML document per page, naming the page image a renderer would write
//! at [`AnnotationOptions::dpi`] and listing every region as an `<object>`
//! with a lower-case class name and an integer bounding box.

use std::fmt;
use std::str::FromStr;

use tagbox_core::{PageAnnotations, Rect};

/// Coordinate system of written bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coords {
    /// PDF user space: points, origin at the bottom left, y up.
    #[default]
    Page,
    /// Pixels of the page image at the configured DPI, origin at the top
    /// left, y down.
    Pixel,
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Coords::Page => "page",
            Coords::Pixel => "pixel",
        })
    }
}

impl FromStr for Coords {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "page" => Ok(Coords::Page),
            "pixel" => Ok(Coords::Pixel),
            other => Err(format!(
                "unknown coordinate system '{other}' (expected page or pixel)"
            )),
        }
    }
}

/// Options for annotation records.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationOptions {
    /// Resolution of the page image the record refers to. Default 150.
    pub dpi: u32,
    pub coords: Coords,
}

impl Default for AnnotationOptions {
    fn default() -> Self {
        Self {
            dpi: 150,
            coords: Coords::Page,
        }
    }
}

impl AnnotationOptions {
    /// Pixels per PDF point.
    pub fn scale(&self) -> f64 {
        f64::from(self.dpi) / 72.0
    }

    /// Size in pixels of a page image rendered at [`Self::dpi`], at least
    /// one pixel each way.
    pub fn image_size(&self, media_box: &Rect) -> (u32, u32) {
        let scale = self.scale();
        let px = |points: f64| ((points * scale).floor() as u32).max(1);
        (px(media_box.width()), px(media_box.height()))
    }

    /// `rect` in the configured coordinate system, truncated to integers.
    pub fn bounding_box(&self, rect: &Rect, media_box: &Rect) -> [i64; 4] {
        match self.coords {
            Coords::Page => [rect.x_min, rect.y_min, rect.x_max, rect.y_max].map(|v| v as i64),
            Coords::Pixel => {
                let scale = self.scale();
                [
                    (rect.x_min - media_box.x_min) * scale,
                    (media_box.y_max - rect.y_max) * scale,
                    (rect.x_max - media_box.x_min) * scale,
                    (media_box.y_max - rect.y_min) * scale,
                ]
                .map(|v| v as i64)
            }
        }
    }
}

/// `{stem}_{index:03}.{extension}`, the naming shared by page images and
/// their annotation records. `index` is 0-based.
pub fn file_name(stem: &str, index: usize, extension: &str) -> String {
    format!("{stem}_{index:03}.{extension}")
}

/// The annotation record of one page.
pub fn page_record(stem: &str, page: &PageAnnotations, options: &AnnotationOptions) -> String {
    let (width, height) = options.image_size(&page.media_box);
    let image = file_name(stem, page.page.index(), "jpeg");

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<annotation>\n");
    xml.push_str(&format!("  <filename>{}</filename>\n", escape_xml(&image)));
    xml.push_str(&format!(
        "  <size>\n    <width>{width}</width>\n    <height>{height}</height>\n    \
         <depth>3</depth>\n  </size>\n"
    ));
    xml.push_str("  <segmented>0</segmented>\n");
    for annotation in &page.annotations {
        let [xmin, ymin, xmax, ymax] = options.bounding_box(&annotation.rect, &page.media_box);
        xml.push_str(&format!(
            "  <object>\n    <name>{}</name>\n    <bndbox>\n      <xmin>{xmin}</xmin>\n      \
             <ymin>{ymin}</ymin>\n      <xmax>{xmax}</xmax>\n      <ymax>{ymax}</ymax>\n    \
             </bndbox>\n  </object>\n",
            annotation.category.label()
        ));
    }
    xml.push_str("</annotation>\n");
    xml
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
