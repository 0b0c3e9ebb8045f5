//! Statement lenses over compiled documents.

use crate::helpers::source_fixtures::*;
use serde_json::json;
use trilogy_ls::base::Span;
use trilogy_ls::dialect::DuckDbDialect;
use trilogy_ls::hir::{Lens, RENDER_QUERY_COMMAND, RUN_QUERY_COMMAND, build_lenses, run_semantic_pass};
use trilogy_ls::parser::{SourceParser, TrilogyParser};
use trilogy_ls::semantic::{Environment, TrilogyCompiler};

fn lenses_of(source: &str) -> Vec<Lens> {
    let tree = TrilogyParser.parse(source).unwrap();
    let outcome = run_semantic_pass(&TrilogyCompiler::default(), Environment::new(), source, &tree);
    assert!(outcome.is_resolved(), "semantic pass failed: {:?}", outcome.error);
    build_lenses(&outcome.statements, &outcome.environment, &DuckDbDialect)
}

#[test]
fn test_queries_and_raw_sql() {
    let lenses = lenses_of(USERS_QUERIES);
    assert_eq!(lenses.len(), 3);

    let (run, render, raw) = (&lenses[0], &lenses[1], &lenses[2]);
    assert_eq!(run.command_id, RUN_QUERY_COMMAND);
    assert_eq!(run.range, Span::from_coords(9, 1, 9, 10));
    let sql = run.arguments[0].as_str().unwrap();
    assert!(sql.contains("app.users"));

    assert_eq!(render.command_id, RENDER_QUERY_COMMAND);
    assert_eq!(render.range, Span::from_coords(9, 2, 9, 10));
    assert_eq!(render.arguments, vec![json!([sql]), json!("duckdb")]);
    assert_eq!(run.correlation_id, render.correlation_id);

    assert_eq!(raw.range.start.line, 10);
    assert_eq!(raw.arguments, vec![json!("select 1")]);
    assert!(raw.correlation_id > run.correlation_id);
}

#[test]
fn test_unrenderable_statement_does_not_hide_others() {
    let source = format!("{USERS_MODEL}key orphan int;\nselect orphan;\nselect name;\n");
    let lenses = lenses_of(&source);
    assert_eq!(lenses.len(), 2);
    assert!(lenses.iter().all(|l| l.range.start.line == 11));
}

#[test]
fn test_lenses_are_deterministic() {
    assert_eq!(lenses_of(USERS_QUERIES), lenses_of(USERS_QUERIES));
}
