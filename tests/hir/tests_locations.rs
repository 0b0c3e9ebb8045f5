//! Location extraction over real parse trees.

use crate::helpers::analysis_helpers::*;
use crate::helpers::source_fixtures::*;
use rstest::rstest;
use trilogy_ls::base::{Position, SourceSpan};
use trilogy_ls::hir::{PositionIndex, SymbolLocation};

// =============================================================================
// ADDRESSING
// =============================================================================

#[test]
fn test_key_property_select_locations() {
    let locations = locations_of(KEY_PROPERTY_SELECT);
    let summary: Vec<(&str, bool, u32)> = locations
        .iter()
        .map(|l| (l.address.as_str(), l.is_definition, l.span.start_line))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("local.user_id", true, 1),
            ("local.user_id.name", true, 2),
            ("local.user_id", false, 3),
        ]
    );
}

#[test]
fn test_dotted_reference_keeps_raw_text() {
    let locations = locations_of(DOTTED_SELECT);
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].address, "user_id.name");
    assert!(!locations[0].is_definition);
}

#[rstest]
#[case("key orders.id int;\n", "local.orders.id")]
#[case("select orders.id;\n", "orders.id")]
#[case("select id;\n", "local.id")]
fn test_definitions_always_qualified_references_only_when_bare(
    #[case] source: &str,
    #[case] address: &str,
) {
    assert_eq!(locations_of(source)[0].address, address);
}

#[test]
fn test_spans_follow_token_convention() {
    let locations = locations_of(KEY_PROPERTY_SELECT);
    assert_eq!(locations[0].span, SourceSpan::single_line(1, 5, 12));
    assert_eq!(locations[2].span, SourceSpan::single_line(3, 8, 15));
}

#[test]
fn test_grain_and_column_references_are_recorded() {
    let locations = locations_of(USERS_MODEL);
    let references: Vec<&str> = locations
        .iter()
        .filter(|l| !l.is_definition)
        .map(|l| l.address.as_str())
        .collect();
    assert!(references.contains(&"local.name"));
    assert!(references.iter().filter(|&&a| a == "local.user_id").count() >= 2);
    // The datasource's own name is not a concept.
    assert!(!references.contains(&"local.users"));
}

#[test]
fn test_extraction_is_deterministic() {
    assert_eq!(locations_of(USERS_QUERIES), locations_of(USERS_QUERIES));
}

// =============================================================================
// CONTAINMENT
// =============================================================================

fn index() -> PositionIndex {
    PositionIndex::new(vec![
        SymbolLocation {
            address: "local.a".to_string(),
            span: SourceSpan::single_line(1, 5, 6),
            is_definition: true,
        },
        SymbolLocation {
            address: "local.multi".to_string(),
            span: SourceSpan::new(2, 10, 4, 3),
            is_definition: false,
        },
    ])
}

#[rstest]
#[case(0, 3, None)]
#[case(0, 4, Some("local.a"))]
#[case(0, 5, Some("local.a"))]
#[case(0, 6, None)]
#[case(1, 8, None)]
#[case(1, 9, Some("local.multi"))]
#[case(2, 0, Some("local.multi"))]
#[case(3, 2, Some("local.multi"))]
#[case(3, 3, None)]
fn test_containment(#[case] line: u32, #[case] col: u32, #[case] expected: Option<&str>) {
    let index = index();
    let found = index.find_containing(Position::new(line, col));
    assert_eq!(found.map(|l| l.address.as_str()), expected);
}
