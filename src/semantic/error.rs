//! Error types for semantic compilation.

use thiserror::Error;

/// Errors raised while building the concept model from a parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    /// A reference that never resolved, even after the second pass.
    #[error("Undefined concept '{address}' on line {line}")]
    UndefinedConcept { address: String, line: u32 },

    #[error("Unknown datatype '{name}' on line {line}")]
    UnknownDatatype { name: String, line: u32 },

    #[error("Unknown function '{name}' on line {line}")]
    UnknownFunction { name: String, line: u32 },

    /// Same address declared twice with a different purpose or type.
    #[error("Concept '{address}' redeclared with a different definition on line {line}")]
    ConflictingDeclaration { address: String, line: u32 },

    #[error("Datasource '{name}' declared twice (line {line})")]
    DuplicateDatasource { name: String, line: u32 },

    #[error("Cannot resolve import '{path}': {reason}")]
    ImportNotFound { path: String, reason: String },

    #[error("Circular import of '{path}'")]
    CircularImport { path: String },

    #[error("Failed to parse import '{path}': {message}")]
    ImportParse { path: String, message: String },

    /// Tree shape the builder does not understand.
    #[error("Invalid {rule} on line {line}: {message}")]
    Malformed {
        rule: &'static str,
        line: u32,
        message: String,
    },

    /// A pass was started before the one it depends on.
    #[error("Semantic passes run out of order")]
    NotPrepared,
}

impl SemanticError {
    pub fn malformed(rule: &'static str, line: u32, message: impl Into<String>) -> Self {
        Self::Malformed {
            rule,
            line,
            message: message.into(),
        }
    }

    /// Source line the error points at, when it has one.
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::UndefinedConcept { line, .. }
            | Self::UnknownDatatype { line, .. }
            | Self::UnknownFunction { line, .. }
            | Self::ConflictingDeclaration { line, .. }
            | Self::DuplicateDatasource { line, .. }
            | Self::Malformed { line, .. } => Some(*line),
            _ => None,
        }
    }
}
