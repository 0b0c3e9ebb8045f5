//! Hover feature tests for the IDE layer.

use crate::helpers::analysis_helpers::*;
use crate::helpers::source_fixtures::*;
use trilogy_ls::base::Position;

// =============================================================================
// HOVER ON CONCEPTS
// =============================================================================

#[test]
fn test_hover_on_key_reference() {
    let host = host_with(KEY_PROPERTY_SELECT);
    let analysis = host.analysis(TEST_URI);

    let hover = analysis.hover(Position::new(2, 8)).expect("hover on user_id");
    assert_eq!(hover.address.as_deref(), Some("local.user_id"));
    assert!(!hover.is_definition);
    assert!(
        hover.contents.starts_with("**key** `user_id`: `int`"),
        "unexpected hover: {}",
        hover.contents
    );
    assert!(hover.contents.contains("**Definition:** line 1"));
    assert_eq!(
        (hover.start_line, hover.start_col, hover.end_line, hover.end_col),
        (2, 7, 2, 14)
    );
}

#[test]
fn test_hover_on_property_definition_promotes_to_property() {
    let host = host_with(KEY_PROPERTY_SELECT);
    let analysis = host.analysis(TEST_URI);

    let hover = analysis.hover(Position::new(1, 12)).unwrap();
    assert!(hover.is_definition);
    assert_eq!(hover.address.as_deref(), Some("local.name"));
    assert!(hover.contents.starts_with("**property** `name`: `string`"));
    assert!(hover.contents.contains("**Keys:** `local.user_id`"));
    assert!(hover.contents.contains("**Defined on line:** 2"));
}

#[test]
fn test_hover_shows_description_and_derivation() {
    let host = host_with(USERS_MODEL);
    let analysis = host.analysis(TEST_URI);

    let (line, col) = position_of(USERS_MODEL, "user_count", 0);
    let hover = analysis.hover(Position::new(line, col)).unwrap();
    assert!(hover.contents.contains("**Derivation:** `count(local.user_id)`"));

    let key = analysis.hover(Position::new(0, 5)).unwrap();
    assert!(key.contents.contains("\n\nunique user\n\n"));
}

#[test]
fn test_hover_without_metadata_falls_back() {
    let host = host_with(UNRESOLVED_REFERENCE);
    let analysis = host.analysis(TEST_URI);
    assert!(!analysis.is_resolved());

    let hover = analysis.hover(Position::new(0, 4)).unwrap();
    assert_eq!(hover.contents, "**Concept:** `local.a`\n\n*(definition)*");

    let (line, col) = position_of(UNRESOLVED_REFERENCE, "missing", 0);
    let hover = analysis.hover(Position::new(line, col)).unwrap();
    assert_eq!(hover.contents, "**Concept:** `local.missing`");
}

#[test]
fn test_no_hover_on_whitespace() {
    let host = host_with(KEY_PROPERTY_SELECT);
    assert!(host.analysis(TEST_URI).hover(Position::new(3, 0)).is_none());
}

// =============================================================================
// HOVER ON DECLARATIONS
// =============================================================================

#[test]
fn test_hover_on_datasource() {
    let host = host_with(USERS_MODEL);
    let analysis = host.analysis(TEST_URI);

    let (line, col) = position_of(USERS_MODEL, "users", 0);
    let hover = analysis.hover(Position::new(line, col)).unwrap();
    assert_eq!(
        hover.contents,
        "**root datasource** `users`\n\n**Address:** `app.users`\n\
         **Columns:** `user_id`, `name`\n**Grain:** `user_id`"
    );
    assert!(hover.address.is_none());
}

#[test]
fn test_datasource_hover_takes_priority_over_concepts() {
    let host = host_with(USERS_MODEL);
    let analysis = host.analysis(TEST_URI);

    // `name` in the column list lies inside the datasource span.
    let (line, col) = position_of(USERS_MODEL, "    name", 0);
    let hover = analysis.hover(Position::new(line, col + 4)).unwrap();
    assert!(hover.contents.starts_with("**root datasource**"));
}
