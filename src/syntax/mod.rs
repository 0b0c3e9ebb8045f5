//! Parse trees at the parser boundary.
//!
//! Everything downstream of the parser (symbol extraction, the semantic
//! builder, structure extraction) consumes [`ParseTree`], never the rowan CST.

mod lower;
mod tree;

pub use lower::lower;
pub use tree::{ParseTree, TokenKind, TreeElement, TreeKind, TreeToken};
