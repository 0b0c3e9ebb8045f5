//! Address resolution against metadata from the real compiler.

use crate::helpers::analysis_helpers::*;
use crate::helpers::source_fixtures::*;
use rstest::rstest;
use trilogy_ls::hir::{Role, resolve, resolve_address};

#[rstest]
#[case("local.user_id", Some("local.user_id"))]
#[case("user_id", None)]
#[case("local.user_id.name", Some("local.name"))]
#[case("user_id.name", Some("local.name"))]
#[case("user_id.count", Some("local.user_id.count"))]
#[case("local.user_id.count", Some("local.user_id.count"))]
#[case("nope", None)]
#[case("local.nope", None)]
fn test_resolution_against_compiled_model(#[case] address: &str, #[case] expected: Option<&str>) {
    let metadata = metadata_of(USERS_MODEL);
    assert_eq!(resolve_address(address, &metadata).as_deref(), expected);
}

#[test]
fn test_every_definition_resolves() {
    let metadata = metadata_of(USERS_MODEL);
    for location in locations_of(USERS_MODEL).iter().filter(|l| l.is_definition) {
        assert!(
            resolve(&location.address, &metadata).is_some(),
            "definition {} did not resolve",
            location.address
        );
    }
}

#[test]
fn test_metadata_fields_from_compiler() {
    let metadata = metadata_of(USERS_MODEL);

    let key = &metadata["local.user_id"];
    assert_eq!(key.role, Role::Key);
    assert_eq!(key.datatype, "int");
    assert_eq!(key.description.as_deref(), Some("unique user"));
    assert_eq!(key.def_line, Some(1));

    let name = &metadata["local.name"];
    assert_eq!(name.role, Role::Property);
    assert_eq!(name.dependency_keys, Some(vec!["local.user_id".to_string()]));

    let count = &metadata["local.user_count"];
    assert_eq!(count.role, Role::Metric);
    assert_eq!(count.lineage.as_deref(), Some("count(local.user_id)"));

    let auto = &metadata["local.user_id.count"];
    assert!(auto.is_auto_derived());
}

#[test]
fn test_metadata_is_deterministic() {
    let first: Vec<String> = metadata_of(USERS_MODEL).keys().cloned().collect();
    let second: Vec<String> = metadata_of(USERS_MODEL).keys().cloned().collect();
    assert_eq!(first, second);
}
