//! Semantic compiler tests
//!
//! Tests for:
//! - Import loading relative to the document's directory
//! - Imported concepts in editor features

pub mod tests_imports;
