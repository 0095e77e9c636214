//! Load lopdf-built documents and run the full analysis over them.

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tagbox_core::{AnalyzeOptions, Rect, TagCategory, WarningCode, analyze_document};
use tagbox_parse::LopdfDocument;

const PAGE_CONTENT: &str = "\
/P <</MCID 0>> BDC BT /F1 10 Tf 100 200 Td (AB) Tj ET EMC
/Table <</MCID 1>> BDC BT /F1 20 Tf 50 500 Td (A) Tj ET EMC
/Figure <</MCID 2>> BDC q 200 0 0 150 100 300 cm /Im1 Do Q EMC
";

fn assert_rect_near(actual: Rect, expected: Rect) {
    let close = |a: f64, b: f64| (a - b).abs() < 1e-6;
    assert!(
        close(actual.x_min, expected.x_min)
            && close(actual.y_min, expected.y_min)
            && close(actual.x_max, expected.x_max)
            && close(actual.y_max, expected.y_max),
        "{actual:?} != {expected:?}"
    );
}

/// Square Type3 glyphs: one text-space unit wide and tall.
fn type3_font(doc: &mut Document) -> ObjectId {
    let glyph = doc.add_object(Stream::new(
        dictionary! {},
        b"1000 0 0 0 1000 1000 d1 0 0 1000 1000 re f".to_vec(),
    ));
    let to_unicode = doc.add_object(Stream::new(
        dictionary! {},
        b"begincmap 1 begincodespacerange <00> <FF> endcodespacerange \
          2 beginbfchar <41> <0041> <42> <0042> endbfchar endcmap"
            .to_vec(),
    ));
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type3",
        "FontBBox" => vec![0.into(), 0.into(), 1000.into(), 1000.into()],
        "CharProcs" => dictionary! { "square" => glyph },
        "Encoding" => dictionary! {
            "Type" => "Encoding",
            "Differences" => vec![65.into(), "square".into(), "square".into()],
        },
        "FirstChar" => 65i64,
        "LastChar" => 66i64,
        "Widths" => vec![1000.into(), 1000.into()],
        "ToUnicode" => to_unicode,
    })
}

/// TrueType font embedding the triangle fixture, whose only glyph is `A`.
fn truetype_font(doc: &mut Document, flags: i64) -> ObjectId {
    let program = doc.add_object(Stream::new(
        dictionary! {},
        include_bytes!("fixtures/triangle.ttf").to_vec(),
    ));
    let descriptor = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => "Triangle",
        "Flags" => flags,
        "FontBBox" => vec![16.into(), 0.into(), 1384.into(), 1493.into()],
        "FontFile2" => program,
    });
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => "Triangle",
        "FirstChar" => 65i64,
        "LastChar" => 65i64,
        "Widths" => vec![684.into()],
        "FontDescriptor" => descriptor,
    })
}

/// One page drawing `content`; `tagged` adds a structure tree over MCIDs 0-2.
fn build_pdf(content: &str, tagged: bool) -> Vec<u8> {
    build_pdf_with_font(content, tagged, type3_font)
}

fn build_pdf_with_font(
    content: &str,
    tagged: bool,
    font: impl FnOnce(&mut Document) -> ObjectId,
) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font = font(&mut doc);
    let image = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2i64,
            "Height" => 2i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8i64,
        },
        vec![0u8; 4],
    ));
    let content = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
    let page = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font },
            "XObject" => dictionary! { "Im1" => image },
        },
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
        let root_id = doc.new_object_id();
        let document_id = doc.new_object_id();
        let kid = |doc: &mut Document, role: &str, mcid: i64| {
            doc.add_object(dictionary! {
                "Type" => "StructElem",
                "S" => role,
                "P" => document_id,
                "K" => mcid,
            })
        };
        let para = kid(&mut doc, "P", 0);
        let table = kid(&mut doc, "Table", 1);
        let figure = kid(&mut doc, "Figure", 2);
        doc.objects.insert(
            document_id,
            Object::Dictionary(dictionary! {
                "Type" => "StructElem",
                "S" => "Document",
                "P" => root_id,
                "Pg" => page,
                "K" => vec![para.into(), table.into(), figure.into()],
            }),
        );
        doc.objects.insert(
            root_id,
            Object::Dictionary(dictionary! {
                "Type" => "StructTreeRoot",
                "K" => document_id,
            }),
        );
        catalog.set("StructTreeRoot", root_id);
        catalog.set("MarkInfo", dictionary! { "Marked" => true });
    }
    let catalog = doc.add_object(catalog);
    doc.trailer.set("Root", catalog);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

#[test]
fn tagged_document_yields_text_table_and_figures() {
    let options = AnalyzeOptions::default();
    let pdf = LopdfDocument::open(&build_pdf(PAGE_CONTENT, true), &options).unwrap();
    let loaded = pdf.load(&options);
    assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
    assert_eq!(loaded.fonts.len(), 1);

    let result = analyze_document(&loaded.content, &loaded.fonts, &options);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    let page = &result.value.pages[0];
    assert_eq!(page.media_box, Rect::new(0.0, 0.0, 612.0, 792.0));

    let categories: Vec<_> = page.annotations.iter().map(|a| a.category).collect();
    assert_eq!(
        categories,
        vec![
            TagCategory::Text,
            TagCategory::Table,
            TagCategory::Figure,
            TagCategory::Figure,
        ]
    );
    assert_rect_near(page.annotations[0].rect, Rect::new(100.0, 200.0, 120.0, 210.0));
    assert_rect_near(page.annotations[1].rect, Rect::new(50.0, 500.0, 70.0, 520.0));
    let image = Rect::new(100.0, 300.0, 300.0, 450.0);
    assert_rect_near(page.annotations[2].rect, image);
    assert_rect_near(page.annotations[3].rect, image);
}

#[test]
fn glyph_text_comes_from_to_unicode() {
    let options = AnalyzeOptions::default();
    let pdf = LopdfDocument::open(&build_pdf(PAGE_CONTENT, true), &options).unwrap();
    let loaded = pdf.load(&options);
    let groups = &loaded.content.pages[0].groups;
    assert_eq!(groups[0].text(), "AB");
    assert_eq!(groups[1].text(), "A");
}

#[test]
fn untagged_document_reports_only_the_image() {
    let options = AnalyzeOptions::default();
    let pdf = LopdfDocument::open(&build_pdf(PAGE_CONTENT, false), &options).unwrap();
    assert!(!pdf.has_structure_tree());
    let loaded = pdf.load(&options);
    let result = analyze_document(&loaded.content, &loaded.fonts, &options);

    let annotations = &result.value.pages[0].annotations;
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].category, TagCategory::Figure);
    assert_rect_near(annotations[0].rect, Rect::new(100.0, 300.0, 300.0, 450.0));
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, WarningCode::MissingStructTree);
}

#[test]
fn unplaced_image_falls_back_to_pixel_bounds() {
    let options = AnalyzeOptions::default();
    let pdf = LopdfDocument::open(&build_pdf("/P <</MCID 0>> BDC EMC", false), &options).unwrap();
    let loaded = pdf.load(&options);
    let result = analyze_document(&loaded.content, &loaded.fonts, &options);
    let annotations = &result.value.pages[0].annotations;
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].rect, Rect::new(0.0, 0.0, 2.0, 2.0));
}

#[test]
fn embedded_truetype_glyphs_are_measured_from_their_outlines() {
    let content = "/P <</MCID 0>> BDC BT /F1 10 Tf 100 200 Td (A) Tj ET EMC";
    let expected = Rect::new(100.078125, 200.0, 106.7578125, 207.2998046875);
    for flags in [4, 32] {
        let options = AnalyzeOptions::default();
        let pdf = build_pdf_with_font(content, true, |doc| truetype_font(doc, flags));
        let pdf = LopdfDocument::open(&pdf, &options).unwrap();
        let loaded = pdf.load(&options);
        assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);

        let result = analyze_document(&loaded.content, &loaded.fonts, &options);
        let text: Vec<_> = result.value.pages[0]
            .annotations
            .iter()
            .filter(|a| a.category == TagCategory::Text)
            .collect();
        assert_eq!(text.len(), 1, "flags {flags}: {text:?}");
        assert_rect_near(text[0].rect, expected);
    }
}
