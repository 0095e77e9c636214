//! Error types for the parsing and interpreter layers.
//!
//! Uses [`thiserror`] for error derivation. [`BackendError`] wraps
//! backend-specific failures and converts into [`TagboxError`].

use tagbox_core::TagboxError;
use thiserror::Error;

/// Error type for PDF backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] TagboxError),
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

impl From<BackendError> for TagboxError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => TagboxError::ParseError(msg),
            BackendError::Io(e) => TagboxError::IoError(e.to_string()),
            BackendError::Interpreter(msg) => {
                TagboxError::ParseError(format!("content stream: {msg}"))
            }
            BackendError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = BackendError::Parse("invalid xref table".to_string());
        assert_eq!(err.to_string(), "PDF parse error: invalid xref table");
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: BackendError = io_err.into();
        assert!(matches!(err, BackendError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn content_stream_errors_become_parse_errors() {
        let err = crate::tokenizer::tokenize(b"[1 2").unwrap_err();
        assert!(matches!(err, BackendError::Interpreter(_)));
        let err = TagboxError::from(err);
        assert!(
            matches!(err, TagboxError::ParseError(ref m) if m.starts_with("content stream: ")),
            "{err:?}"
        );
    }

    #[test]
    fn core_error_passes_through() {
        let core = TagboxError::PasswordRequired;
        let err: BackendError = core.clone().into();
        assert_eq!(TagboxError::from(err), core);
    }
}
