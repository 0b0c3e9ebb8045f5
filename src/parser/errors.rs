//! Parse errors reported at the parser boundary.

use smol_str::SmolStr;
use thiserror::Error;

/// Marker used for the offending token when input ends early.
pub const END_OF_INPUT: &str = "$END";

/// A single unexpected token.
///
/// Line and column are 1-indexed, pointing at the first character of the
/// offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected token '{token}'. Expected one of:\n{{{}}}", .expected.join(", "))]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub token: SmolStr,
    pub expected: Vec<SmolStr>,
}

impl ParseError {
    pub fn new(line: u32, column: u32, token: impl Into<SmolStr>) -> Self {
        Self {
            line,
            column,
            token: token.into(),
            expected: Vec::new(),
        }
    }

    pub fn with_expected<I, S>(mut self, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.expected = expected.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_end_of_input(&self) -> bool {
        self.token == END_OF_INPUT
    }

    /// Width of the offending token in characters (at least one).
    pub fn token_width(&self) -> u32 {
        if self.is_end_of_input() {
            1
        } else {
            (self.token.chars().count() as u32).max(1)
        }
    }
}

/// Parsing failed; carries every error the parser collected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse document: {} error(s)", .errors.len())]
pub struct ParseFailure {
    pub errors: Vec<ParseError>,
}

impl ParseFailure {
    pub fn new(errors: Vec<ParseError>) -> Self {
        Self { errors }
    }
}
