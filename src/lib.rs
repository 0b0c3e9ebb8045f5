//! # trilogy-ls-base
//!
//! Core library behind the Trilogy language server: a position-addressable
//! symbol index over Trilogy documents, address resolution against the
//! semantic model, and runnable-statement code lenses.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Editor features (hover, goto, references, outline, completion)
//!   ↓
//! hir       → Symbol locations, address resolution, metadata, lenses
//!   ↓
//! dialect   → SQL rendering of resolved statements
//!   ↓
//! semantic  → Two-pass compiler: Environment, Concept, Statement
//!   ↓
//! syntax    → ParseTree at the parser boundary
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, rowan CST
//!   ↓
//! base      → Primitives (SourceSpan, Position, LineIndex, DocumentId)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → semantic → dialect → hir → ide)
// ============================================================================

/// Foundation types: spans, positions, line index, document identity
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, lowering to ParseTree
pub mod parser;

/// Syntax: the ParseTree consumed by everything after the parser
pub mod syntax;

/// Semantic compiler: concepts, datasources, imports, statements
pub mod semantic;

/// SQL dialect renderers
pub mod dialect;

/// Symbol index: locations, resolution, metadata, lenses
pub mod hir;

/// Editor features: hover, goto-definition, references, completion
pub mod ide;

// Re-export foundation types
pub use base::{DocumentId, LineCol, LineIndex, Position, SourceSpan, Span, TextRange, TextSize};
