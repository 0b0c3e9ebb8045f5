//! Symbol index tests
//!
//! Tests for:
//! - Location extraction and addressing
//! - Address resolution against compiled metadata
//! - Semantic pass outcomes
//! - Statement lenses

pub mod tests_lenses;
pub mod tests_locations;
pub mod tests_resolution;
pub mod tests_semantic_pass;
