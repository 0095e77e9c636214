//! Small helpers over lopdf objects shared by the loaders.

use lopdf::{Dictionary, Document, Object, Stream};
use tagbox_core::{Matrix, Rect};

use crate::error::BackendError;

/// Follow one level of indirection; dangling references resolve to themselves.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Dictionary entry `key`, resolved.
pub(crate) fn entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().map(|obj| resolve(doc, obj))
}

pub(crate) fn dict_entry<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    entry(doc, dict, key).and_then(|obj| obj.as_dict().ok())
}

pub(crate) fn name_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match entry(doc, dict, key)? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

pub(crate) fn number_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f64> {
    entry(doc, dict, key).and_then(number)
}

/// Numbers of an array entry, unresolvable elements skipped.
pub(crate) fn numbers(doc: &Document, obj: &Object) -> Vec<f64> {
    match resolve(doc, obj) {
        Object::Array(items) => items
            .iter()
            .filter_map(|item| number(resolve(doc, item)))
            .collect(),
        _ => Vec::new(),
    }
}

/// A four-number rectangle entry (`/MediaBox`, `/FontBBox`, `/BBox`).
pub(crate) fn rect_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<Rect> {
    let values = numbers(doc, dict.get(key).ok()?);
    let coords: [f64; 4] = values.as_slice().try_into().ok()?;
    Some(Rect::from_array(coords))
}

/// A six-number matrix entry (`/Matrix`, `/FontMatrix`).
pub(crate) fn matrix_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<Matrix> {
    let values = numbers(doc, dict.get(key).ok()?);
    let coords: [f64; 6] = values.as_slice().try_into().ok()?;
    Some(Matrix::from_array(coords))
}

/// Stream content with filters applied.
pub(crate) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Decode a PDF text string: UTF-16BE or UTF-8 with a byte order mark,
/// otherwise PDFDocEncoding, which agrees with Windows-1252 on printable
/// characters.
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (text, _) = encoding_rs::UTF_16BE.decode_with_bom_removal(bytes);
        text.into_owned()
    } else if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        let (text, _) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
        text.into_owned()
    } else {
        let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
        text.into_owned()
    }
}

/// A text-string or name entry.
pub(crate) fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match entry(doc, dict, key)? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn text_strings_honor_byte_order_marks() {
        assert_eq!(decode_text_string(b"plain"), "plain");
        assert_eq!(
            decode_text_string(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]),
            "Hi"
        );
        assert_eq!(decode_text_string(&[0xEF, 0xBB, 0xBF, b'o', b'k']), "ok");
        // 0x80 is the euro sign in both PDFDocEncoding and Windows-1252.
        assert_eq!(decode_text_string(&[0x80]), "\u{20AC}");
    }

    #[test]
    fn rect_and_matrix_entries() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 10.into(), Object::Real(2.5)],
            "Short" => vec![1.into(), 2.into()],
        };
        assert_eq!(
            rect_entry(&doc, &dict, b"MediaBox"),
            Some(Rect::new(0.0, 0.0, 612.0, 792.0))
        );
        assert_eq!(
            matrix_entry(&doc, &dict, b"Matrix"),
            Some(Matrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 2.5))
        );
        assert_eq!(rect_entry(&doc, &dict, b"Short"), None);
        assert_eq!(rect_entry(&doc, &dict, b"Missing"), None);
    }

    #[test]
    fn references_are_resolved() {
        let mut doc = Document::with_version("1.5");
        let size = doc.add_object(Object::Integer(12));
        let dict = dictionary! { "Size" => size, "Name" => "Helvetica" };
        assert_eq!(number_entry(&doc, &dict, b"Size"), Some(12.0));
        assert_eq!(name_entry(&doc, &dict, b"Name").as_deref(), Some("Helvetica"));
    }
}
