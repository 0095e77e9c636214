//! Content stream interpreter.
//!
//! Walks tokenized operators, tracks the CTM and text state, and reports
//! marked-content boundaries, positioned glyphs and image placements to a
//! [`ContentHandler`]. Form XObjects are interpreted recursively up to
//! [`AnalyzeOptions::max_recursion_depth`].

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object};
use tagbox_core::{
    AnalysisWarning, AnalyzeOptions, FontId, GlyphPlacement, Matrix, PageId, Rect, WarningCode,
};

use crate::error::BackendError;
use crate::fonts::FontStore;
use crate::handler::{ContentHandler, ImageEvent};
use crate::interpreter_state::InterpreterState;
use crate::objects::{dict_entry, matrix_entry, name_entry, resolve, stream_bytes};
use crate::text_state::{FontSelection, TextParams, TextState};
use crate::tokenizer::{Operand, Operator, tokenize};

/// The unit square an image XObject occupies in its own space.
const UNIT_SQUARE: Rect = Rect {
    x_min: 0.0,
    y_min: 0.0,
    x_max: 1.0,
    y_max: 1.0,
};

/// Interprets the content streams of one page.
pub struct Interpreter<'a> {
    doc: &'a Document,
    fonts: &'a mut FontStore,
    options: &'a AnalyzeOptions,
    page: PageId,
    /// Font resource names already reported missing on this page.
    missing_fonts: HashSet<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        doc: &'a Document,
        fonts: &'a mut FontStore,
        options: &'a AnalyzeOptions,
        page: PageId,
    ) -> Self {
        Self {
            doc,
            fonts,
            options,
            page,
            missing_fonts: HashSet::new(),
        }
    }

    /// Interpret page content with `resources` in scope.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Interpreter`] when the page content can't be
    /// tokenized. Problems inside Form XObjects only produce warnings.
    pub fn run(
        &mut self,
        content: &[u8],
        resources: &'a Dictionary,
        handler: &mut dyn ContentHandler,
    ) -> Result<(), BackendError> {
        let ops = tokenize(content)?;
        let mut gstate = InterpreterState::new();
        let mut text = TextState::new();
        self.interpret(&ops, resources, handler, 0, &mut gstate, &mut text);
        Ok(())
    }

    fn warn(&self, handler: &mut dyn ContentHandler, code: WarningCode, description: String) {
        handler.on_warning(AnalysisWarning::with_code(code, description).on_page(self.page.index()));
    }

    fn interpret(
        &mut self,
        ops: &[Operator],
        resources: &'a Dictionary,
        handler: &mut dyn ContentHandler,
        depth: usize,
        gstate: &mut InterpreterState,
        text: &mut TextState,
    ) {
        for op in ops {
            match op.name.as_str() {
                "q" => gstate.save_state(&text.params),
                "Q" => match gstate.restore_state() {
                    Some(params) => text.params = params,
                    None => tracing::trace!(page = %self.page, "unbalanced Q"),
                },
                "cm" => {
                    if let Some(m) = op.matrix() {
                        gstate.concat_matrix(&Matrix::from_array(m));
                    }
                }

                "BMC" => {
                    let tag = op.operands.first().and_then(Operand::as_name).unwrap_or("");
                    handler.begin_marked_content(tag, None);
                }
                "BDC" => {
                    let tag = op.operands.first().and_then(Operand::as_name).unwrap_or("");
                    let mcid = op.operands.get(1).and_then(|p| self.mcid(p, resources));
                    handler.begin_marked_content(tag, mcid);
                }
                "EMC" => handler.end_marked_content(),

                "BT" => text.begin_text(),
                "Tf" => {
                    if let Some(name) = op.operands.first().and_then(Operand::as_name) {
                        text.params.font_name = name.to_string();
                        text.params.font = FontSelection::Pending;
                    }
                    if let Some(size) = op.number(1) {
                        text.params.font_size = size;
                    }
                }
                "Tc" => set(&mut text.params.char_spacing, op.number(0)),
                "Tw" => set(&mut text.params.word_spacing, op.number(0)),
                "Tz" => set(&mut text.params.h_scaling, op.number(0)),
                "TL" => set(&mut text.params.leading, op.number(0)),
                "Ts" => set(&mut text.params.rise, op.number(0)),
                "Td" => {
                    if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                        text.move_text_position(tx, ty);
                    }
                }
                "TD" => {
                    if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                        text.move_text_position_and_set_leading(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = op.matrix() {
                        text.set_text_matrix(Matrix::from_array(m));
                    }
                }
                "T*" => text.move_to_next_line(),

                "Tj" => {
                    if let Some(Operand::Bytes(bytes)) = op.operands.first() {
                        let font = self.selected_font(resources, &mut text.params, handler);
                        self.show(bytes, font, gstate, text, handler);
                    }
                }
                "'" => {
                    text.move_to_next_line();
                    if let Some(Operand::Bytes(bytes)) = op.operands.first() {
                        let font = self.selected_font(resources, &mut text.params, handler);
                        self.show(bytes, font, gstate, text, handler);
                    }
                }
                "\"" => {
                    set(&mut text.params.word_spacing, op.number(0));
                    set(&mut text.params.char_spacing, op.number(1));
                    text.move_to_next_line();
                    if let Some(Operand::Bytes(bytes)) = op.operands.get(2) {
                        let font = self.selected_font(resources, &mut text.params, handler);
                        self.show(bytes, font, gstate, text, handler);
                    }
                }
                "TJ" => {
                    if let Some(Operand::Array(items)) = op.operands.first() {
                        let font = self.selected_font(resources, &mut text.params, handler);
                        for item in items {
                            match item {
                                Operand::Bytes(bytes) => {
                                    self.show(bytes, font, gstate, text, handler);
                                }
                                other => {
                                    if let Some(amount) = other.as_f64() {
                                        text.advance(text.tj_adjustment(amount));
                                    }
                                }
                            }
                        }
                    }
                }

                "Do" => {
                    if let Some(name) = op.operands.first().and_then(Operand::as_name) {
                        self.do_xobject(name, resources, handler, depth, gstate, text);
                    }
                }
                _ => {}
            }
        }
    }

    /// `/MCID` of a `BDC` property list, inline or named in `/Properties`.
    fn mcid(&self, properties: &Operand, resources: &Dictionary) -> Option<u32> {
        match properties {
            Operand::Dictionary(_) => properties
                .dict_get("MCID")
                .and_then(Operand::as_f64)
                .and_then(non_negative),
            Operand::Name(name) => {
                let props = dict_entry(self.doc, resources, b"Properties")?;
                let list = dict_entry(self.doc, props, name.as_bytes())?;
                match resolve(self.doc, list.get(b"MCID").ok()?) {
                    Object::Integer(i) => u32::try_from(*i).ok(),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Font for a text-showing operator. A pending `Tf` selection is looked
    /// up in `resources` now.
    fn selected_font(
        &mut self,
        resources: &Dictionary,
        params: &mut TextParams,
        handler: &mut dyn ContentHandler,
    ) -> Option<FontId> {
        if params.font == FontSelection::Pending {
            params.font = match self.resolve_font(resources, &params.font_name, handler) {
                Some(id) => FontSelection::Loaded(id),
                None => FontSelection::Missing,
            };
        }
        params.font.font()
    }

    /// Look up font resource `name`, loading it on first use.
    fn resolve_font(
        &mut self,
        resources: &Dictionary,
        name: &str,
        handler: &mut dyn ContentHandler,
    ) -> Option<FontId> {
        if name.is_empty() {
            return None;
        }
        let font_obj = dict_entry(self.doc, resources, b"Font")
            .and_then(|fonts| fonts.get(name.as_bytes()).ok());
        let Some(font_obj) = font_obj else {
            if self.missing_fonts.insert(name.to_string()) {
                self.warn(
                    handler,
                    WarningCode::MissingFont,
                    format!("font /{name} not found in resources"),
                );
            }
            return None;
        };
        let mut warnings = Vec::new();
        let id = self.fonts.load(self.doc, font_obj, &mut warnings);
        for warning in warnings {
            handler.on_warning(warning.on_page(self.page.index()));
        }
        Some(id)
    }

    fn show(
        &self,
        bytes: &[u8],
        font: Option<FontId>,
        gstate: &InterpreterState,
        text: &mut TextState,
        handler: &mut dyn ContentHandler,
    ) {
        let Some(loaded) = font.and_then(|id| self.fonts.font(id).map(|f| (id, f))) else {
            return;
        };
        let (id, f) = loaded;
        let single_byte = !f.is_composite();
        for code in f.decode(bytes) {
            let trm = text.rendering_matrix(gstate.ctm());
            let mut glyph = GlyphPlacement::new(id, code, trm);
            if let Some(unicode) = f.unicode(code) {
                glyph = glyph.with_unicode(unicode);
            }
            tracing::trace!(page = %self.page, code, "glyph");
            handler.on_glyph(glyph);
            let tx = text.displacement(f.advance(code), code, single_byte);
            text.advance(tx);
        }
    }

    fn do_xobject(
        &mut self,
        name: &str,
        resources: &'a Dictionary,
        handler: &mut dyn ContentHandler,
        depth: usize,
        gstate: &mut InterpreterState,
        text: &mut TextState,
    ) {
        let doc = self.doc;
        let entry = dict_entry(doc, resources, b"XObject")
            .and_then(|xobjects| xobjects.get(name.as_bytes()).ok());
        let Some(entry) = entry else {
            tracing::debug!(page = %self.page, name, "XObject not found in resources");
            return;
        };
        let object_id = entry.as_reference().ok();
        let Ok(stream) = resolve(doc, entry).as_stream() else {
            self.warn(
                handler,
                WarningCode::MalformedObject,
                format!("XObject /{name} is not a stream"),
            );
            return;
        };
        match name_entry(doc, &stream.dict, b"Subtype").as_deref() {
            Some("Image") => handler.on_image(ImageEvent {
                name: name.to_string(),
                object_id,
                rect: gstate.ctm().transform_rect(&UNIT_SQUARE),
            }),
            Some("Form") => {
                if depth + 1 > self.options.max_recursion_depth {
                    self.warn(
                        handler,
                        WarningCode::DepthLimit,
                        format!(
                            "Form XObject /{name} exceeds recursion depth {}",
                            self.options.max_recursion_depth
                        ),
                    );
                    return;
                }
                let ops = match stream_bytes(stream).and_then(|data| tokenize(&data)) {
                    Ok(ops) => ops,
                    Err(e) => {
                        self.warn(
                            handler,
                            WarningCode::MalformedObject,
                            format!("Form XObject /{name} unreadable: {e}"),
                        );
                        return;
                    }
                };
                let form_resources = dict_entry(doc, &stream.dict, b"Resources").unwrap_or(resources);
                // The form inherits the font object, not its resource name.
                self.selected_font(resources, &mut text.params, handler);
                let saved_depth = gstate.stack_depth();
                gstate.save_state(&text.params);
                if let Some(m) = matrix_entry(doc, &stream.dict, b"Matrix") {
                    gstate.concat_matrix(&m);
                }
                self.interpret(&ops, form_resources, handler, depth + 1, gstate, text);
                // Drop anything the form left on the stack, then undo its own save.
                while gstate.stack_depth() > saved_depth + 1 {
                    gstate.restore_state();
                }
                if let Some(params) = gstate.restore_state() {
                    text.params = params;
                }
            }
            other => tracing::trace!(page = %self.page, name, subtype = ?other, "XObject skipped"),
        }
    }
}

/// Assign `value` when present.
fn set(slot: &mut f64, value: Option<f64>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn non_negative(value: f64) -> Option<u32> {
    (value >= 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}
