//! Error and warning types for tagbox.
//!
//! Provides [`TagboxError`] for fatal errors that stop processing of a
//! document, [`AnalysisWarning`] for non-fatal anomalies that allow
//! best-effort continuation, [`Analysis`] for pairing a value with its
//! warnings, and [`AnalyzeOptions`] for resource limits and toggles.

use std::fmt;

/// Fatal error types for document analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum TagboxError {
    /// Error parsing PDF structure or syntax.
    ParseError(String),
    /// I/O error reading PDF data.
    IoError(String),
    /// A configured resource limit was exceeded.
    ResourceLimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_input_bytes").
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
    /// The PDF is encrypted and cannot be read without a password.
    PasswordRequired,
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for TagboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagboxError::ParseError(msg) => write!(f, "parse error: {msg}"),
            TagboxError::IoError(msg) => write!(f, "I/O error: {msg}"),
            TagboxError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})"
            ),
            TagboxError::PasswordRequired => write!(f, "PDF is encrypted and requires a password"),
            TagboxError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TagboxError {}

impl From<std::io::Error> for TagboxError {
    fn from(err: std::io::Error) -> Self {
        TagboxError::IoError(err.to_string())
    }
}

/// Machine-readable category of an [`AnalysisWarning`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum WarningCode {
    /// A structure node pointed at a marked-content id the page doesn't have.
    UnresolvedMcid,
    /// A glyph placement carried more than one character code.
    AmbiguousGlyph,
    /// A structure-tree entry of an unexpected kind was skipped.
    UnrecognizedNode,
    /// The document has no structure tree; only image figures are reported.
    MissingStructTree,
    /// A font program couldn't be loaded; its glyphs are unmeasurable.
    UnsupportedFont,
    /// A referenced font was not found in the resources.
    MissingFont,
    /// A PDF object is malformed or has unexpected structure.
    MalformedObject,
    /// Nesting exceeded a configured depth and was truncated.
    DepthLimit,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl WarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            WarningCode::UnresolvedMcid => "UNRESOLVED_MCID",
            WarningCode::AmbiguousGlyph => "AMBIGUOUS_GLYPH",
            WarningCode::UnrecognizedNode => "UNRECOGNIZED_NODE",
            WarningCode::MissingStructTree => "MISSING_STRUCT_TREE",
            WarningCode::UnsupportedFont => "UNSUPPORTED_FONT",
            WarningCode::MissingFont => "MISSING_FONT",
            WarningCode::MalformedObject => "MALFORMED_OBJECT",
            WarningCode::DepthLimit => "DEPTH_LIMIT",
            WarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal anomaly encountered while loading or analyzing a document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisWarning {
    /// Machine-readable warning code.
    pub code: WarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Page the warning relates to (0-indexed), if applicable.
    pub page: Option<usize>,
    /// Element context (e.g., "element /P").
    pub element: Option<String>,
}

impl AnalysisWarning {
    /// Create a warning with a specific code and description.
    pub fn with_code(code: WarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            element: None,
        }
    }

    /// Attach page context (builder pattern).
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach element context (builder pattern).
    pub fn in_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {})", page + 1)?;
        }
        if let Some(ref element) = self.element {
            write!(f, " [{element}]")?;
        }
        Ok(())
    }
}

/// Logs warnings as they happen and keeps them when asked to.
#[derive(Debug, Default)]
pub struct WarningSink {
    collect: bool,
    warnings: Vec<AnalysisWarning>,
}

impl WarningSink {
    pub fn new(collect: bool) -> Self {
        Self {
            collect,
            warnings: Vec::new(),
        }
    }

    pub fn push(&mut self, warning: AnalysisWarning) {
        tracing::warn!(code = %warning.code, "{warning}");
        if self.collect {
            self.warnings.push(warning);
        }
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = AnalysisWarning>) {
        for warning in warnings {
            self.push(warning);
        }
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_vec(self) -> Vec<AnalysisWarning> {
        self.warnings
    }
}

/// Result wrapper that pairs a value with collected warnings.
#[derive(Debug, Clone)]
pub struct Analysis<T> {
    /// The computed value.
    pub value: T,
    /// Warnings collected while computing it.
    pub warnings: Vec<AnalysisWarning>,
}

impl<T> Analysis<T> {
    /// Create a result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<AnalysisWarning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Transform the value while preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Analysis<U> {
        Analysis {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Options controlling loading limits and analysis behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOptions {
    /// Maximum recursion depth for nested Form XObjects (default: 10).
    pub max_recursion_depth: usize,
    /// Maximum nesting depth accepted while reading the structure tree
    /// (default: 256).
    pub max_struct_depth: usize,
    /// Maximum input PDF size in bytes (default: None = no limit).
    pub max_input_bytes: Option<usize>,
    /// Whether to collect warnings (default: true). Warnings are logged
    /// through `tracing` either way.
    pub collect_warnings: bool,
    /// Measure glyphs without outline access from advance width and font
    /// ascent/descent instead of skipping them (default: false).
    pub metrics_fallback: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            max_struct_depth: 256,
            max_input_bytes: None,
            collect_warnings: true,
            metrics_fallback: false,
        }
    }
}
