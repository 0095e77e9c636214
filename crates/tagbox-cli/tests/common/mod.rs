//! lopdf-built fixtures shared by the command tests.

use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};

/// A one-page PDF with a Table (MCID 0) and a Figure (MCID 1), each
/// painting the same 1x1 image; the structure tree is included when
/// `tagged`.
pub fn sample_pdf(tagged: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let image = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1i64,
            "Height" => 1i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8i64,
        },
        vec![0u8],
    ));
    let content = doc.add_object(Stream::new(
        dictionary! {},
        b"/Table <</MCID 0>> BDC q 100 0 0 50 10 20 cm /Im1 Do Q EMC\n\
          /Figure <</MCID 1>> BDC q 30 0 0 30 300 400 cm /Im1 Do Q EMC\n"
            .to_vec(),
    ));
    let page = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content,
        "Resources" => dictionary! { "XObject" => dictionary! { "Im1" => image } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page)],
            "Count" => 1i64,
        }),
    );

    let mut catalog = dictionary! { "Type" => "Catalog", "Pages" => pages_id };
    if tagged {
        let table = doc.add_object(dictionary! {
            "Type" => "StructElem", "S" => "Table", "Pg" => page, "K" => 0i64,
        });
        let figure = doc.add_object(dictionary! {
            "Type" => "StructElem",
            "S" => "Figure",
            "Pg" => page,
            "Alt" => Object::string_literal("a chart"),
            "K" => 1i64,
        });
        let document = doc.add_object(dictionary! {
            "Type" => "StructElem",
            "S" => "Document",
            "K" => vec![table.into(), figure.into()],
        });
        let root = doc.add_object(dictionary! { "Type" => "StructTreeRoot", "K" => document });
        catalog.set("StructTreeRoot", root);
    }
    let catalog = doc.add_object(catalog);
    doc.trailer.set("Root", catalog);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("failed to write fixture");
    path
}
