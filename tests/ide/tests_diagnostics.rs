//! Diagnostics produced by validation.

use crate::helpers::analysis_helpers::*;
use crate::helpers::source_fixtures::*;
use trilogy_ls::ide::AnalysisHost;

#[test]
fn test_unparsable_document() {
    let host = AnalysisHost::new();
    let diagnostics = host.validate(TEST_URI, UNPARSABLE);

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert!(diagnostic.is_error());
    assert_eq!(
        (diagnostic.start_line, diagnostic.start_col, diagnostic.end_line, diagnostic.end_col),
        (0, 12, 0, 13)
    );
    assert!(diagnostic.message.starts_with("Unexpected token ';'"));

    let analysis = host.analysis(TEST_URI);
    assert!(analysis.locations().is_empty());
    assert!(analysis.lenses().is_empty());
    assert_eq!(analysis.diagnostics().len(), 1);
}

#[test]
fn test_semantic_errors_are_not_diagnostics() {
    let host = AnalysisHost::new();
    assert!(host.validate(TEST_URI, UNRESOLVED_REFERENCE).is_empty());

    let analysis = host.analysis(TEST_URI);
    assert!(analysis.metadata().is_empty());
    assert!(analysis.lenses().is_empty());
    // Tree-level results survive a failed semantic pass.
    assert_eq!(analysis.locations().len(), 3);
}

#[test]
fn test_fixing_the_document_clears_diagnostics() {
    let host = AnalysisHost::new();
    assert!(!host.validate(TEST_URI, UNPARSABLE).is_empty());
    assert!(host.validate(TEST_URI, KEY_PROPERTY_SELECT).is_empty());
    assert!(host.analysis(TEST_URI).diagnostics().is_empty());
    assert_eq!(host.analysis(TEST_URI).locations().len(), 3);
}
