//! Rowan-based parser for Trilogy
//!
//! This module provides a lossless parser using:
//! - **logos** for fast lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! lower → ParseTree (rule names, 1-indexed token positions)
//! ```
//!
//! The rest of the crate only sees the [`SourceParser`] trait, so the
//! reference parser here can be swapped for another implementation.

#[allow(clippy::module_inception)]
mod parser;

mod errors;
mod lexer;
mod syntax_kind;

pub use errors::{END_OF_INPUT, ParseError, ParseFailure};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{Parse, SyntaxError, TYPE_NAMES, parse};
pub use syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, TrilogyLanguage};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};

use crate::base::LineIndex;
use crate::syntax::{ParseTree, lower};

/// Turns source text into a [`ParseTree`].
pub trait SourceParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<ParseTree, ParseFailure>;
}

/// The built-in Trilogy parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrilogyParser;

impl TrilogyParser {
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for TrilogyParser {
    fn parse(&self, text: &str) -> Result<ParseTree, ParseFailure> {
        let parse = parse(text);
        if parse.ok() {
            return Ok(lower(&parse.syntax(), text));
        }

        let index = LineIndex::new(text);
        let errors = parse
            .errors
            .iter()
            .map(|error| {
                let at = index.line_col(error.range.start());
                let mut expected: Vec<&str> =
                    error.expected.iter().map(|k| k.display_name()).collect();
                expected.sort_unstable();
                expected.dedup();
                ParseError::new(at.line_one_indexed(), at.col_one_indexed(), error.found.clone())
                    .with_expected(expected)
            })
            .collect();
        Err(ParseFailure::new(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_lowers_tree() {
        let tree = TrilogyParser.parse("key a int;\n").unwrap();
        assert_eq!(tree.nodes().count(), 1);
    }

    #[test]
    fn test_parse_failure_positions_are_one_indexed() {
        let failure = TrilogyParser.parse("key a int;\nkey b int\n").unwrap_err();
        assert_eq!(failure.errors.len(), 1);
        let error = &failure.errors[0];
        assert_eq!(error.token, END_OF_INPUT);
        assert_eq!(error.expected, vec!["SEMICOLON"]);
    }

    #[test]
    fn test_parse_failure_reports_token_location() {
        let failure = TrilogyParser.parse("select\n  ;").unwrap_err();
        let error = &failure.errors[0];
        assert_eq!((error.line, error.column), (2, 3));
        assert_eq!(error.token, ";");
    }
}
