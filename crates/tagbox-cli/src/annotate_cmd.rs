use std::fs;
use std::path::{Path, PathBuf};

use tagbox::json::document_json;
use tagbox::{
    Analysis, AnalyzeOptions, AnnotationOptions, Coords, DocumentAnnotations, Pdf, file_name,
    page_record,
};

use crate::cli::RecordFormat;
use crate::shared::{resolve_pages, select_pages};

pub struct AnnotateArgs {
    pub output: Option<PathBuf>,
    pub dpi: u32,
    pub coords: Coords,
    pub format: RecordFormat,
    pub pages: Option<String>,
    pub metrics_fallback: bool,
}

struct Summary {
    pages: usize,
    regions: usize,
}

pub fn run(input: &Path, args: &AnnotateArgs) -> Result<(), i32> {
    let documents = collect_inputs(input).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    if documents.is_empty() {
        eprintln!("Error: no PDF files found in {}", input.display());
        return Err(1);
    }

    let out_dir = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(input));
    let annotations_dir = out_dir.join("annotations");
    fs::create_dir_all(&annotations_dir).map_err(|e| {
        eprintln!(
            "Error: cannot create output directory {}: {e}",
            annotations_dir.display()
        );
        1
    })?;

    let mut failed = 0usize;
    for path in &documents {
        match annotate_document(path, &annotations_dir, args) {
            Ok(summary) => println!(
                "{}: {} pages, {} regions",
                path.display(),
                summary.pages,
                summary.regions
            ),
            Err(message) => {
                eprintln!("Error: {}: {message}", path.display());
                failed += 1;
            }
        }
    }
    tracing::info!(
        documents = documents.len(),
        failed,
        output = %annotations_dir.display(),
        "annotation finished"
    );

    if failed > 0 {
        eprintln!("{failed} of {} documents failed", documents.len());
        return Err(1);
    }
    Ok(())
}

/// `input` itself, or every `*.pdf` file directly inside it, sorted.
fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>, String> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(format!("input not found: {}", input.display()));
    }
    let entries = fs::read_dir(input)
        .map_err(|e| format!("cannot read directory {}: {e}", input.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_pdf(path))
        .collect();
    files.sort();
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// `output` inside an input directory, or next to an input file.
fn default_output_dir(input: &Path) -> PathBuf {
    if input.is_dir() {
        return input.join("output");
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join("output"),
        _ => PathBuf::from("output"),
    }
}

fn annotate_document(path: &Path, dir: &Path, args: &AnnotateArgs) -> Result<Summary, String> {
    let options = AnalyzeOptions {
        metrics_fallback: args.metrics_fallback,
        ..AnalyzeOptions::default()
    };
    let pdf = Pdf::open_file(path, Some(options)).map_err(|e| e.to_string())?;
    let analysis = pdf.analyze().map_err(|e| e.to_string())?;
    let selected = resolve_pages(args.pages.as_deref(), pdf.page_count())?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let pages: Vec<_> = select_pages(&analysis.value.pages, &selected)
        .cloned()
        .collect();
    let summary = Summary {
        pages: pages.len(),
        regions: pages.iter().map(|p| p.annotations.len()).sum(),
    };

    match args.format {
        RecordFormat::Xml => {
            let record_options = AnnotationOptions {
                dpi: args.dpi,
                coords: args.coords,
            };
            for page in &pages {
                let target = dir.join(file_name(&stem, page.page.index(), "xml"));
                let xml = page_record(&stem, page, &record_options);
                fs::write(&target, xml)
                    .map_err(|e| format!("cannot write {}: {e}", target.display()))?;
            }
        }
        RecordFormat::Json => {
            let selected =
                Analysis::with_warnings(DocumentAnnotations { pages }, analysis.warnings);
            let json = document_json(&stem, &selected).map_err(|e| e.to_string())?;
            let target = dir.join(format!("{stem}.json"));
            fs::write(&target, json)
                .map_err(|e| format!("cannot write {}: {e}", target.display()))?;
        }
    }
    tracing::debug!(document = %path.display(), pages = summary.pages, "records written");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_next_to_file() {
        assert_eq!(
            default_output_dir(Path::new("/data/papers/a.pdf")),
            PathBuf::from("/data/papers/output")
        );
        assert_eq!(default_output_dir(Path::new("a.pdf")), PathBuf::from("output"));
    }

    #[test]
    fn directory_inputs_are_sorted_pdfs_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let files = collect_inputs(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
        assert_eq!(default_output_dir(dir.path()), dir.path().join("output"));
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(collect_inputs(Path::new("/nonexistent/tagbox")).is_err());
    }
}
