//! Completion and signature help tests.

use crate::helpers::analysis_helpers::*;
use crate::helpers::source_fixtures::*;
use trilogy_ls::base::Position;
use trilogy_ls::ide::{CompletionKind, KEYWORDS, TRILOGY_FUNCTIONS};

#[test]
fn test_completion_order_and_groups() {
    let host = host_with(USERS_MODEL);
    let items = host.analysis(TEST_URI).completions();

    let concepts: Vec<&str> = items
        .iter()
        .filter(|i| i.sort_priority == 0)
        .map(|i| i.label.as_ref())
        .collect();
    assert_eq!(concepts, vec!["user_id", "user_id.count", "name", "user_count"]);

    assert_eq!(
        items.iter().filter(|i| i.kind == CompletionKind::Keyword).count(),
        KEYWORDS.len()
    );
    assert_eq!(
        items.iter().filter(|i| i.kind == CompletionKind::Function).count(),
        TRILOGY_FUNCTIONS.len()
    );

    let users = items.iter().find(|i| i.label.as_ref() == "users").unwrap();
    assert_eq!(users.kind, CompletionKind::Struct);
    assert_eq!(users.detail.as_deref(), Some("datasource -> app.users"));
}

#[test]
fn test_concept_completion_documentation() {
    let host = host_with(USERS_MODEL);
    let items = host.analysis(TEST_URI).completions();
    let key = items.iter().find(|i| i.label.as_ref() == "user_id").unwrap();
    assert_eq!(key.kind, CompletionKind::Field);
    assert_eq!(
        key.documentation.as_deref(),
        Some("**key** `user_id`: `int`\n\nunique user")
    );
}

#[test]
fn test_completion_without_snapshot_still_offers_builtins() {
    let host = trilogy_ls::ide::AnalysisHost::new();
    let items = host.analysis("file:///never-opened.preql").completions();
    assert_eq!(items.len(), KEYWORDS.len() + TRILOGY_FUNCTIONS.len());
}

#[test]
fn test_signature_help_in_document() {
    let source = "key a int;\nselect coalesce(a, ";
    let host = host_with(source);
    let help = host
        .analysis(TEST_URI)
        .signature_help(Position::new(1, 19))
        .unwrap();
    assert_eq!(help.label, "coalesce(value1, value2, ...) -> value");
    assert_eq!(help.active_parameter, Some(1));
}
