//! Source locations for indexed symbols.
//!
//! Parser tokens report 1-indexed lines and columns, with an end column one
//! past the last character. Editor requests arrive 0-indexed.

use serde::Serialize;

/// A span in source text (1-indexed, both ends inclusive).
///
/// The end column follows the parser's token convention of
/// `start_col + len(token)`, so a cursor resting just after an identifier
/// still counts as inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceSpan {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

/// A position in source text (0-indexed, editor convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// A 0-indexed range, as handed to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Span on a single line.
    pub fn single_line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self::new(line, start_col, line, end_col)
    }

    /// Check whether a 1-indexed line/column falls within this span.
    pub fn contains(&self, line: u32, col: u32) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if self.start_line == self.end_line {
            return self.start_col <= col && col <= self.end_col;
        }
        if line == self.start_line {
            col >= self.start_col
        } else if line == self.end_line {
            col <= self.end_col
        } else {
            true
        }
    }

    /// Check whether a 0-indexed editor position falls within this span.
    pub fn contains_position(&self, position: Position) -> bool {
        self.contains(position.line + 1, position.column + 1)
    }

    /// Convert to the 0-indexed editor range.
    pub fn to_span(self) -> Span {
        Span::from_coords(
            self.start_line.saturating_sub(1),
            self.start_col.saturating_sub(1),
            self.end_line.saturating_sub(1),
            self.end_col.saturating_sub(1),
        )
    }
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span from line/column coordinates
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}
