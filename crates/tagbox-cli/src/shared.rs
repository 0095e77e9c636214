use std::path::Path;

use tagbox::{AnalyzeOptions, PageAnnotations, Pdf};

use crate::page_range::parse_page_range;

/// Open a PDF file, printing a readable message to stderr on failure.
pub fn open_pdf(file: &Path, options: Option<AnalyzeOptions>) -> Result<Pdf, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    Pdf::open_file(file, options).map_err(|e| {
        eprintln!("Error: failed to open PDF {}: {e}", file.display());
        1
    })
}

/// Resolve an optional page range string into 0-based page indexes.
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<Vec<usize>, String> {
    match pages {
        Some(range) => parse_page_range(range, page_count),
        None => Ok((0..page_count).collect()),
    }
}

/// The pages of `all` whose index is in `selected`.
pub fn select_pages<'a>(
    all: &'a [PageAnnotations],
    selected: &[usize],
) -> impl Iterator<Item = &'a PageAnnotations> {
    all.iter()
        .filter(move |page| selected.binary_search(&page.page.index()).is_ok())
}

/// `[x_min, y_min, x_max, y_max]` with two decimals.
pub fn format_rect(rect: &tagbox::Rect) -> String {
    format!(
        "[{:.2}, {:.2}, {:.2}, {:.2}]",
        rect.x_min, rect.y_min, rect.x_max, rect.y_max
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbox::{PageId, Rect};

    fn page(index: usize) -> PageAnnotations {
        PageAnnotations {
            page: PageId(index),
            media_box: Rect::new(0.0, 0.0, 10.0, 10.0),
            annotations: Vec::new(),
        }
    }

    #[test]
    fn all_pages_by_default() {
        assert_eq!(resolve_pages(None, 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(resolve_pages(Some("2"), 3).unwrap(), vec![1]);
        assert!(resolve_pages(Some("9"), 3).is_err());
    }

    #[test]
    fn selection_keeps_document_order() {
        let pages = vec![page(0), page(1), page(2)];
        let picked: Vec<_> = select_pages(&pages, &[0, 2]).map(|p| p.page.index()).collect();
        assert_eq!(picked, vec![0, 2]);
    }

    #[test]
    fn rect_formatting() {
        assert_eq!(
            format_rect(&Rect::new(1.0, 2.5, 3.126, 4.0)),
            "[1.00, 2.50, 3.13, 4.00]"
        );
    }
}
