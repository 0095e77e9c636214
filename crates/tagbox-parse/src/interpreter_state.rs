//! Graphics state stack for the content stream interpreter.
//!
//! Only the parts of the graphics state that move glyphs and images are
//! tracked: the CTM and the text state parameters, saved by `q` and
//! restored by `Q`.

use tagbox_core::Matrix;

use crate::text_state::TextParams;

#[derive(Debug, Clone, PartialEq)]
struct SavedState {
    ctm: Matrix,
    text: TextParams,
}

/// CTM plus the `q`/`Q` stack.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterpreterState {
    ctm: Matrix,
    stack: Vec<SavedState>,
}

impl InterpreterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from `ctm` instead of the identity.
    pub fn with_ctm(ctm: Matrix) -> Self {
        Self {
            ctm,
            stack: Vec::new(),
        }
    }

    pub fn ctm(&self) -> &Matrix {
        &self.ctm
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// `q`: push the CTM and the text parameters.
    pub fn save_state(&mut self, text: &TextParams) {
        self.stack.push(SavedState {
            ctm: self.ctm,
            text: text.clone(),
        });
    }

    /// `Q`: pop the last saved state, returning its text parameters.
    ///
    /// Returns `None` on an unbalanced `Q`, leaving the state untouched.
    pub fn restore_state(&mut self) -> Option<TextParams> {
        let saved = self.stack.pop()?;
        self.ctm = saved.ctm;
        Some(saved.text)
    }

    /// `cm`: CTM' = m × CTM.
    pub fn concat_matrix(&mut self, m: &Matrix) {
        self.ctm = m.concat(&self.ctm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_identity() {
        let state = InterpreterState::new();
        assert_eq!(*state.ctm(), Matrix::identity());
        assert_eq!(state.stack_depth(), 0);
    }

    #[test]
    fn cm_premultiplies() {
        let mut state = InterpreterState::with_ctm(Matrix::scale(2.0, 2.0));
        state.concat_matrix(&Matrix::translate(10.0, 5.0));
        assert_eq!(state.ctm().transform_point(0.0, 0.0), (20.0, 10.0));
    }

    #[test]
    fn save_and_restore_ctm_and_text_params() {
        let mut state = InterpreterState::new();
        let mut params = TextParams::default();
        params.font_size = 12.0;
        state.save_state(&params);
        state.concat_matrix(&Matrix::translate(1.0, 1.0));
        assert_eq!(state.stack_depth(), 1);

        let restored = state.restore_state().unwrap();
        assert_eq!(restored.font_size, 12.0);
        assert_eq!(*state.ctm(), Matrix::identity());
    }

    #[test]
    fn unbalanced_restore_is_ignored() {
        let mut state = InterpreterState::with_ctm(Matrix::translate(3.0, 4.0));
        assert!(state.restore_state().is_none());
        assert_eq!(*state.ctm(), Matrix::translate(3.0, 4.0));
    }
}
