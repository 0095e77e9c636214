//! Text state for the content stream interpreter.
//!
//! Tracks the text object (BT/ET), font selection (Tf), the text and line
//! matrices, and the spacing parameters that determine where each glyph
//! lands. [`TextState::rendering_matrix`] yields the text rendering matrix
//! composed with the CTM, which is what glyph boxes are measured against.

use tagbox_core::{FontId, Matrix};

/// The font a `Tf` selected. Lookup in the resources waits for the first
/// text-showing operator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FontSelection {
    #[default]
    Unset,
    /// Named by `Tf`, not looked up yet.
    Pending,
    Loaded(FontId),
    /// Looked up and not found.
    Missing,
}

impl FontSelection {
    pub fn font(self) -> Option<FontId> {
        match self {
            FontSelection::Loaded(id) => Some(id),
            _ => None,
        }
    }
}

/// Text state parameters saved and restored by `q`/`Q`.
///
/// Excludes the text and line matrices, which belong to the text object.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    /// Character spacing (Tc).
    pub char_spacing: f64,
    /// Word spacing (Tw), applied to single-byte code 32 only.
    pub word_spacing: f64,
    /// Horizontal scaling (Tz) as a percentage.
    pub h_scaling: f64,
    /// Leading (TL).
    pub leading: f64,
    /// Resource name of the current font.
    pub font_name: String,
    pub font: FontSelection,
    pub font_size: f64,
    /// Text rise (Ts).
    pub rise: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            font_name: String::new(),
            font: FontSelection::Unset,
            font_size: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextState {
    pub params: TextParams,
    text_matrix: Matrix,
    line_matrix: Matrix,
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_matrix(&self) -> &Matrix {
        &self.text_matrix
    }

    /// `BT`: reset both matrices.
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::identity();
        self.line_matrix = Matrix::identity();
    }

    /// `Tm`: replace both matrices.
    pub fn set_text_matrix(&mut self, m: Matrix) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: translate the line matrix and start a new line there.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: set leading to `-ty`, then `Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.params.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`.
    pub fn move_to_next_line(&mut self) {
        let leading = self.params.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Shift the text matrix by `tx` text-space units.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translate(tx, 0.0).concat(&self.text_matrix);
    }

    /// Horizontal displacement after painting a glyph of width `w0`
    /// (glyph-space units / 1000) with code `code`.
    ///
    /// `tx = (w0 * Tfs + Tc + Tw) * Th`, where `Tw` applies only to the
    /// single-byte space.
    pub fn displacement(&self, w0: f64, code: u32, single_byte: bool) -> f64 {
        let p = &self.params;
        let word = if single_byte && code == 32 {
            p.word_spacing
        } else {
            0.0
        };
        (w0 * p.font_size + p.char_spacing + word) * (p.h_scaling / 100.0)
    }

    /// Horizontal shift for a number inside a `TJ` array.
    pub fn tj_adjustment(&self, amount: f64) -> f64 {
        -amount / 1000.0 * self.params.font_size * (self.params.h_scaling / 100.0)
    }

    /// `[Tfs*Th 0 0 Tfs 0 Trise] × Tm × CTM`.
    pub fn rendering_matrix(&self, ctm: &Matrix) -> Matrix {
        let p = &self.params;
        Matrix::new(
            p.font_size * (p.h_scaling / 100.0),
            0.0,
            0.0,
            p.font_size,
            0.0,
            p.rise,
        )
        .concat(&self.text_matrix)
        .concat(ctm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_matrix(m: &Matrix, expected: [f64; 6]) {
        let got = [m.a, m.b, m.c, m.d, m.e, m.f];
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() < 1e-10, "expected {expected:?}, got {got:?}");
        }
    }

    #[test]
    fn defaults() {
        let ts = TextState::new();
        assert_eq!(ts.params.h_scaling, 100.0);
        assert_eq!(ts.params.font_size, 0.0);
        assert_matrix(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn td_accumulates_on_line_matrix() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position(72.0, 700.0);
        ts.advance(30.0);
        ts.move_text_position(0.0, -14.0);
        // Second Td is relative to the line start, not the advanced position.
        assert_matrix(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 72.0, 686.0]);
    }

    #[test]
    fn td_capital_sets_leading() {
        let mut ts = TextState::new();
        ts.move_text_position_and_set_leading(0.0, -12.0);
        assert_eq!(ts.params.leading, 12.0);
        ts.move_to_next_line();
        assert_matrix(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 0.0, -24.0]);
    }

    #[test]
    fn tm_replaces_matrices() {
        let mut ts = TextState::new();
        ts.move_text_position(5.0, 5.0);
        ts.set_text_matrix(Matrix::new(2.0, 0.0, 0.0, 2.0, 10.0, 20.0));
        ts.move_text_position(1.0, 1.0);
        assert_matrix(ts.text_matrix(), [2.0, 0.0, 0.0, 2.0, 12.0, 22.0]);
    }

    #[test]
    fn displacement_applies_spacing_and_scaling() {
        let mut ts = TextState::new();
        ts.params.font_size = 10.0;
        ts.params.char_spacing = 1.0;
        ts.params.word_spacing = 2.0;
        ts.params.h_scaling = 50.0;
        assert!((ts.displacement(0.5, 65, true) - 3.0).abs() < 1e-10);
        assert!((ts.displacement(0.5, 32, true) - 4.0).abs() < 1e-10);
        // Word spacing never applies to multi-byte codes.
        assert!((ts.displacement(0.5, 32, false) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn tj_adjustment_moves_left_for_positive_numbers() {
        let mut ts = TextState::new();
        ts.params.font_size = 12.0;
        assert!((ts.tj_adjustment(500.0) + 6.0).abs() < 1e-10);
    }

    #[test]
    fn rendering_matrix_combines_size_rise_tm_and_ctm() {
        let mut ts = TextState::new();
        ts.params.font_size = 12.0;
        ts.params.rise = 3.0;
        ts.set_text_matrix(Matrix::translate(100.0, 200.0));
        let trm = ts.rendering_matrix(&Matrix::scale(2.0, 2.0));
        assert_matrix(&trm, [24.0, 0.0, 0.0, 24.0, 200.0, 406.0]);
    }
}
