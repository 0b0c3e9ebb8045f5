//! Go-to-definition and find-references over validated documents.

use crate::helpers::analysis_helpers::*;
use crate::helpers::source_fixtures::*;
use trilogy_ls::base::Position;

// =============================================================================
// GOTO DEFINITION
// =============================================================================

#[test]
fn test_goto_from_reference_uses_declaration_position() {
    let host = host_with(KEY_PROPERTY_SELECT);
    let result = host.analysis(TEST_URI).goto_definition(Position::new(2, 9));

    assert_eq!(result.targets.len(), 1);
    let target = &result.targets[0];
    assert_eq!(target.address, "local.user_id");
    // The declaration statement spans `key user_id int;`.
    assert_eq!((target.start_line, target.start_col), (0, 0));
    assert_eq!((target.end_line, target.end_col), (0, 16));
}

#[test]
fn test_goto_on_definition_is_empty() {
    let host = host_with(KEY_PROPERTY_SELECT);
    assert!(host.analysis(TEST_URI).goto_definition(Position::new(0, 5)).is_empty());
}

#[test]
fn test_goto_without_metadata_uses_definition_locations() {
    let host = host_with(UNRESOLVED_REFERENCE);
    let result = host.analysis(TEST_URI).goto_definition(Position::new(1, 7));
    assert_eq!(result.targets.len(), 1);
    assert_eq!(
        (result.targets[0].start_line, result.targets[0].start_col),
        (0, 4)
    );
}

// =============================================================================
// FIND REFERENCES
// =============================================================================

const REPEATED: &str = "key user_id int;\nselect user_id;\nselect local.user_id;\n";

#[test]
fn test_references_match_resolved_addresses() {
    let host = host_with(REPEATED);
    let analysis = host.analysis(TEST_URI);

    let result = analysis.find_references(Position::new(1, 8), false);
    assert_eq!(result.address.as_deref(), Some("local.user_id"));
    let lines: Vec<u32> = result.references.iter().map(|r| r.start_line).collect();
    assert_eq!(lines, vec![1, 2]);

    let with_declaration = analysis.find_references(Position::new(1, 8), true);
    assert_eq!(with_declaration.len(), 3);
    assert!(with_declaration.references[0].is_definition);
}

#[test]
fn test_references_of_promoted_property() {
    let source = "key user_id int;\nproperty user_id.name string;\nselect name, user_id.name;\n";
    let host = host_with(source);
    let analysis = host.analysis(TEST_URI);

    let (line, col) = position_of(source, "name", 2);
    let result = analysis.find_references(Position::new(line, col), true);
    assert_eq!(result.address.as_deref(), Some("local.name"));
    assert_eq!(result.len(), 3);
}
