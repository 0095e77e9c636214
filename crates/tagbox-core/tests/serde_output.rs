//! Serialization of the public output types.

#![cfg(feature = "serde")]

use tagbox_core::*;

/// Helper: serialize to JSON string, deserialize back, assert equality.
fn roundtrip<T>(value: &T)
where
    T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let json = serde_json::to_string(value).expect("serialize failed");
    let restored: T = serde_json::from_str(&json).expect("deserialize failed");
    assert_eq!(*value, restored, "round-trip mismatch for JSON: {json}");
}

#[test]
fn page_annotations_roundtrip() {
    roundtrip(&PageAnnotations {
        page: PageId(4),
        media_box: Rect::new(0.0, 0.0, 612.0, 792.0),
        annotations: vec![
            Annotation {
                category: TagCategory::Table,
                rect: Rect::new(72.0, 100.0, 540.0, 400.0),
                source: AnnotationSource::Structure,
            },
            Annotation {
                category: TagCategory::Figure,
                rect: Rect::new(10.0, 10.0, 20.0, 20.0),
                source: AnnotationSource::Image,
            },
        ],
    });
}

#[test]
fn category_and_source_use_readable_names() {
    let json = serde_json::to_string(&Annotation {
        category: TagCategory::Text,
        rect: Rect::new(1.0, 2.0, 3.0, 4.0),
        source: AnnotationSource::Image,
    })
    .unwrap();
    assert!(json.contains("\"category\":\"text\""), "{json}");
    assert!(json.contains("\"source\":\"image\""), "{json}");
    assert!(json.contains("\"x_min\":1.0"), "{json}");
}

#[test]
fn warning_roundtrip() {
    roundtrip(
        &AnalysisWarning::with_code(WarningCode::UnresolvedMcid, "MCID 3 not found").on_page(2),
    );
    roundtrip(&AnalysisWarning::with_code(
        WarningCode::Other("custom".to_string()),
        "something else",
    ));
}
