//! Advance widths and vertical metrics from font dictionaries.
//!
//! Simple fonts declare widths through `/FirstChar` + `/Widths`, composite
//! fonts through the descendant's `/W` and `/DW`. Ascent and descent come
//! from the `/FontDescriptor`. All values are in glyph space units.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use crate::objects::{dict_entry, number, number_entry, numbers, rect_entry, resolve};
use tagbox_core::Rect;

/// Ascent used when the descriptor has none (750/1000 of text space).
const DEFAULT_ASCENT: f64 = 750.0;

/// Descent used when the descriptor has none.
const DEFAULT_DESCENT: f64 = -250.0;

/// Width for codes without a declared width in a simple font.
const DEFAULT_WIDTH: f64 = 600.0;

/// `/DW` default for CID fonts.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
enum Widths {
    Simple { first_char: u32, widths: Vec<f64> },
    Cid(HashMap<u32, f64>),
}

/// Widths plus descriptor metrics of one font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    widths: Widths,
    missing_width: f64,
    ascent: f64,
    descent: f64,
    font_bbox: Option<Rect>,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            widths: Widths::Simple {
                first_char: 0,
                widths: Vec::new(),
            },
            missing_width: DEFAULT_WIDTH,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            font_bbox: None,
        }
    }
}

impl FontMetrics {
    /// Metrics of a simple font (Type1, TrueType, Type3).
    pub fn simple(doc: &Document, font: &Dictionary) -> Self {
        let first_char = number_entry(doc, font, b"FirstChar").map_or(0, |v| v.max(0.0) as u32);
        let widths = font
            .get(b"Widths")
            .map(|obj| numbers(doc, obj))
            .unwrap_or_default();
        let mut metrics = Self::from_descriptor(doc, font, DEFAULT_WIDTH);
        metrics.widths = Widths::Simple { first_char, widths };
        metrics
    }

    /// Metrics of a descendant CID font.
    pub fn cid(doc: &Document, cid_font: &Dictionary) -> Self {
        let default_width = number_entry(doc, cid_font, b"DW").unwrap_or(DEFAULT_CID_WIDTH);
        let widths = cid_font
            .get(b"W")
            .map(|w| parse_cid_widths(doc, resolve(doc, w)))
            .unwrap_or_default();
        let mut metrics = Self::from_descriptor(doc, cid_font, default_width);
        metrics.missing_width = default_width;
        metrics.widths = Widths::Cid(widths);
        metrics
    }

    fn from_descriptor(doc: &Document, font: &Dictionary, missing_width: f64) -> Self {
        let Some(desc) = dict_entry(doc, font, b"FontDescriptor") else {
            return Self {
                missing_width,
                ..Self::default()
            };
        };
        let ascent = number_entry(doc, desc, b"Ascent").filter(|a| *a != 0.0);
        let descent = number_entry(doc, desc, b"Descent").filter(|d| *d != 0.0);
        Self {
            widths: Widths::Simple {
                first_char: 0,
                widths: Vec::new(),
            },
            missing_width: number_entry(doc, desc, b"MissingWidth").unwrap_or(missing_width),
            ascent: ascent.unwrap_or(DEFAULT_ASCENT),
            descent: descent.unwrap_or(DEFAULT_DESCENT),
            font_bbox: rect_entry(doc, desc, b"FontBBox"),
        }
    }

    /// Width of `code` (a character code, or a CID for composite fonts).
    pub fn width(&self, code: u32) -> f64 {
        let declared = match &self.widths {
            Widths::Simple { first_char, widths } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied(),
            Widths::Cid(map) => map.get(&code).copied(),
        };
        declared.unwrap_or(self.missing_width)
    }

    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    pub fn descent(&self) -> f64 {
        self.descent
    }

    /// `/FontBBox` of the descriptor.
    pub fn font_bbox(&self) -> Option<Rect> {
        self.font_bbox
    }

    /// Advance width by ascent/descent box of `code`.
    pub fn metrics_box(&self, code: u32) -> Rect {
        Rect::new(0.0, self.descent, self.width(code), self.ascent)
    }
}

/// Parse a `/W` array: `c [w1 w2 ...]` and `c_first c_last w` entries.
fn parse_cid_widths(doc: &Document, obj: &Object) -> HashMap<u32, f64> {
    let mut out = HashMap::new();
    let Ok(items) = obj.as_array() else {
        return out;
    };
    let mut i = 0;
    while i < items.len() {
        let Some(first) = number(resolve(doc, &items[i])) else {
            break;
        };
        let first = first.max(0.0) as u32;
        match items.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    if let Some(w) = number(resolve(doc, w)) {
                        out.insert(first + offset as u32, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let (Some(last), Some(w)) = (
                    number(last),
                    items.get(i + 2).and_then(|o| number(resolve(doc, o))),
                ) else {
                    break;
                };
                for cid in first..=(last.max(0.0) as u32) {
                    out.insert(cid, w);
                }
                i += 3;
            }
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn defaults_without_descriptor() {
        let doc = Document::with_version("1.5");
        let m = FontMetrics::simple(&doc, &dictionary! { "Subtype" => "Type1" });
        assert_eq!(m.width(65), 600.0);
        assert_eq!(m.ascent(), 750.0);
        assert_eq!(m.descent(), -250.0);
        assert_eq!(m.metrics_box(65), Rect::new(0.0, -250.0, 600.0, 750.0));
    }

    #[test]
    fn simple_widths_and_descriptor() {
        let mut doc = Document::with_version("1.5");
        let desc = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "Ascent" => 718,
            "Descent" => -207,
            "MissingWidth" => 250,
            "FontBBox" => vec![(-166).into(), (-225).into(), 1000.into(), 931.into()],
        });
        let font = dictionary! {
            "FirstChar" => 65,
            "Widths" => vec![667.into(), 611.into()],
            "FontDescriptor" => desc,
        };
        let m = FontMetrics::simple(&doc, &font);
        assert_eq!(m.width(65), 667.0);
        assert_eq!(m.width(66), 611.0);
        assert_eq!(m.width(67), 250.0);
        assert_eq!(m.width(10), 250.0);
        assert_eq!(m.ascent(), 718.0);
        assert_eq!(m.descent(), -207.0);
        assert_eq!(m.font_bbox(), Some(Rect::new(-166.0, -225.0, 1000.0, 931.0)));
    }

    #[test]
    fn cid_widths_both_forms() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "DW" => 500,
            "W" => vec![
                1.into(), Object::Array(vec![100.into(), 200.into()]),
                10.into(), 12.into(), 300.into(),
            ],
        };
        let m = FontMetrics::cid(&doc, &font);
        assert_eq!(m.width(1), 100.0);
        assert_eq!(m.width(2), 200.0);
        assert_eq!(m.width(11), 300.0);
        assert_eq!(m.width(12), 300.0);
        assert_eq!(m.width(13), 500.0);
    }

    #[test]
    fn zero_ascent_falls_back_to_default() {
        let mut doc = Document::with_version("1.5");
        let desc = doc.add_object(dictionary! { "Ascent" => 0, "Descent" => 0 });
        let m = FontMetrics::simple(&doc, &dictionary! { "FontDescriptor" => desc });
        assert_eq!(m.ascent(), 750.0);
        assert_eq!(m.descent(), -250.0);
    }
}
