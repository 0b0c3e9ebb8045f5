//! IDE feature tests
//!
//! Tests for:
//! - Hover information
//! - Diagnostics
//! - Go to definition and find references
//! - Document symbols
//! - Completion and signature help
//! - Host lifecycle: cancellation, parallel validation, close

pub mod tests_completion;
pub mod tests_diagnostics;
pub mod tests_host;
pub mod tests_hover;
pub mod tests_navigation;
pub mod tests_symbols;
