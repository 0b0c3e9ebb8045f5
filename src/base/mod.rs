//! Foundation types for the Trilogy tooling.
//!
//! - [`SourceSpan`] - 1-indexed inclusive spans as reported by the parser
//! - [`Position`], [`Span`] - 0-indexed editor positions
//! - [`LineCol`], [`LineIndex`] - byte offset to line/column conversion
//! - [`DocumentId`] - identity of an open document
//!
//! This module has NO dependencies on other crate modules.

mod document;
mod position;
mod span;

pub use document::DocumentId;
pub use position::{Position, SourceSpan, Span};
pub use span::{LineCol, LineIndex, TextRange, TextSize};

pub use text_size;
