//! Semantic pass outcomes over whole documents.

use crate::helpers::source_fixtures::*;
use trilogy_ls::hir::{DriverState, run_semantic_pass};
use trilogy_ls::parser::{SourceParser, TrilogyParser};
use trilogy_ls::semantic::{Environment, SemanticError, TrilogyCompiler};

#[test]
fn test_failure_leaves_metadata_empty() {
    let tree = TrilogyParser.parse(UNRESOLVED_REFERENCE).unwrap();
    let outcome = run_semantic_pass(
        &TrilogyCompiler::default(),
        Environment::new(),
        UNRESOLVED_REFERENCE,
        &tree,
    );
    assert_eq!(outcome.state, DriverState::Failed);
    assert!(outcome.metadata.is_empty());
    assert!(outcome.statements.is_empty());
    assert!(matches!(
        outcome.error,
        Some(SemanticError::UndefinedConcept { line: 2, .. })
    ));
}

#[test]
fn test_forward_reference_resolves() {
    let source = "metric total <- sum(price);\nproperty price float;\n";
    let tree = TrilogyParser.parse(source).unwrap();
    let outcome = run_semantic_pass(&TrilogyCompiler::default(), Environment::new(), source, &tree);
    assert!(outcome.is_resolved());
    assert_eq!(outcome.metadata["local.total"].datatype, "float");
}
