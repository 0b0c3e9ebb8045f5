//! Diagnostics reported back to the editor.
//!
//! Only parse errors become diagnostics. Semantic failures are logged by the
//! driver and leave the document without metadata for that cycle.

use std::sync::Arc;

use serde::Serialize;

use crate::parser::{ParseError, ParseFailure};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Start line (0-indexed).
    pub start_line: u32,
    /// Start column (0-indexed).
    pub start_col: u32,
    /// End line (0-indexed).
    pub end_line: u32,
    /// End column (0-indexed, exclusive).
    pub end_col: u32,
    pub severity: Severity,
    /// Source of the diagnostic (e.g. "parse").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(line: u32, col: u32, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, line, col, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(line: u32, col: u32, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, line, col, message)
    }

    fn new(severity: Severity, line: u32, col: u32, message: impl Into<Arc<str>>) -> Self {
        Self {
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col,
            severity,
            code: None,
            message: message.into(),
        }
    }

    /// Set the end of the range.
    pub fn with_span(mut self, end_line: u32, end_col: u32) -> Self {
        self.end_line = end_line;
        self.end_col = end_col;
        self
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Diagnostic covering the offending token of a parse error.
    pub fn from_parse_error(error: &ParseError) -> Self {
        let line = error.line.saturating_sub(1);
        let col = error.column.saturating_sub(1);
        Diagnostic::error(line, col, error.to_string())
            .with_span(line, col + error.token_width())
            .with_code("parse")
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// One diagnostic per error the parser collected.
pub fn parse_diagnostics(failure: &ParseFailure) -> Vec<Diagnostic> {
    failure.errors.iter().map(Diagnostic::from_parse_error).collect()
}
