use std::path::Path;

use tagbox::tagbox_core::{Classification, PageBoxes, StructElement};
use tagbox::WalkObserver;

use crate::shared::{format_rect, open_pdf};

/// One printed line per structure element, filled in when the element
/// finishes.
#[derive(Debug, Default)]
struct TreePrinter {
    lines: Vec<ElementLine>,
    open: Vec<usize>,
}

#[derive(Debug)]
struct ElementLine {
    depth: usize,
    role: String,
    alt_text: Option<String>,
    boxes: PageBoxes,
    classification: Option<Classification>,
}

impl WalkObserver for TreePrinter {
    fn element_entered(&mut self, depth: usize, element: &StructElement) {
        self.open.push(self.lines.len());
        self.lines.push(ElementLine {
            depth,
            role: element.role.clone(),
            alt_text: element.alt_text.clone(),
            boxes: PageBoxes::new(),
            classification: None,
        });
    }

    fn element_finished(
        &mut self,
        _depth: usize,
        _element: &StructElement,
        boxes: &PageBoxes,
        classification: Option<Classification>,
    ) {
        if let Some(line) = self.open.pop().and_then(|i| self.lines.get_mut(i)) {
            line.boxes = boxes.clone();
            line.classification = classification;
        }
    }
}

impl ElementLine {
    fn render(&self) -> String {
        let indent = "  ".repeat(self.depth.saturating_sub(1));
        let class = match self.classification {
            Some(Classification::Tag(category)) => category.label(),
            Some(Classification::Suppressed) => "suppressed",
            None => "empty",
        };
        let mut out = format!("{indent}/{} [{class}]", self.role);
        if let Some(alt) = &self.alt_text {
            out.push_str(&format!(" alt={alt:?}"));
        }
        for (page, rect) in &self.boxes {
            out.push_str(&format!("\n{indent}    {page}: {}", format_rect(rect)));
        }
        out
    }
}

pub fn run(file: &Path) -> Result<(), i32> {
    let pdf = open_pdf(file, None)?;
    if !pdf.has_structure_tree() {
        println!("{}: no structure tree", file.display());
    }

    let mut printer = TreePrinter::default();
    let analysis = pdf.walk_structure(&mut printer).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    for line in &printer.lines {
        println!("{}", line.render());
    }
    for warning in &analysis.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
