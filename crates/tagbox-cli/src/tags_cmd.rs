use std::path::Path;

use tagbox::AnnotationSource;

use crate::cli::TextFormat;
use crate::shared::{format_rect, open_pdf, resolve_pages, select_pages};

pub fn run(file: &Path, format: TextFormat, pages: Option<&str>) -> Result<(), i32> {
    let pdf = open_pdf(file, None)?;
    let analysis = pdf.analyze().map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    let selected = resolve_pages(pages, pdf.page_count()).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    match format {
        TextFormat::Text => {
            for page in select_pages(&analysis.value.pages, &selected) {
                println!("Page {}:", page.page.index() + 1);
                for annotation in &page.annotations {
                    let source = match annotation.source {
                        AnnotationSource::Structure => "",
                        AnnotationSource::Image => " (image)",
                    };
                    println!(
                        "  {:<6} {}{source}",
                        annotation.category.label(),
                        format_rect(&annotation.rect)
                    );
                }
            }
            for warning in &analysis.warnings {
                eprintln!("warning: {warning}");
            }
        }
        TextFormat::Json => {
            let records: Vec<serde_json::Value> = select_pages(&analysis.value.pages, &selected)
                .flat_map(|page| {
                    page.annotations.iter().map(move |a| {
                        serde_json::json!({
                            "page": page.page.index() + 1,
                            "category": a.category.label(),
                            "rect": [a.rect.x_min, a.rect.y_min, a.rect.x_max, a.rect.y_max],
                            "source": match a.source {
                                AnnotationSource::Structure => "structure",
                                AnnotationSource::Image => "image",
                            },
                        })
                    })
                })
                .collect();
            let json = serde_json::to_string_pretty(&records).map_err(|e| {
                eprintln!("Error: {e}");
                1
            })?;
            println!("{json}");
        }
    }
    Ok(())
}
