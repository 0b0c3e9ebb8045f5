//! Imports resolved from disk through the analysis host.

use std::fs;
use std::path::Path;

use crate::helpers::analysis_helpers::position_of;
use trilogy_ls::base::Position;
use trilogy_ls::ide::{AnalysisConfig, AnalysisHost};
use tempfile::TempDir;

const ORDERS: &str = "key order_id int;\nproperty order_id.total float; # order value\n";
const MAIN: &str = "import orders as o;\nselect o.order_id, o.total;\n";

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("orders.preql"), ORDERS).unwrap();
    dir
}

fn uri_in(dir: &Path, file: &str) -> String {
    format!("file://{}", dir.join(file).display())
}

fn at(needle: &str, nth: usize) -> Position {
    let (line, column) = position_of(MAIN, needle, nth);
    Position::new(line, column)
}

#[test]
fn test_imports_resolve_next_to_document() {
    let dir = workspace();
    let uri = uri_in(dir.path(), "main.preql");
    let host = AnalysisHost::new();
    assert!(host.validate(uri.as_str(), MAIN).is_empty());

    let analysis = host.analysis(uri.as_str());
    assert!(analysis.is_resolved());
    assert!(analysis.resolve("o.total").is_some());
    assert_eq!(analysis.lenses().len(), 0);

    let hover = analysis.hover(at("o.total", 0)).unwrap();
    assert_eq!(hover.address.as_deref(), Some("o.total"));
    assert!(hover.contents.starts_with("**property** `total`: `float`"));
    assert!(hover.contents.contains("order value"));
    assert!(hover.contents.contains("**Namespace:** `o`"));
    assert!(hover.contents.contains("**Keys:** `o.order_id`"));
    // Positions of imported concepts point into the other file.
    assert!(!hover.contents.contains("**Defined on line:**"));
    assert!(!hover.contents.contains("**Definition:**"));
}

#[test]
fn test_configured_working_path_wins() {
    let dir = workspace();
    let config = AnalysisConfig::default().with_working_path(dir.path());
    let host = AnalysisHost::with_config(config).unwrap();
    host.validate("untitled:Untitled-1", MAIN);

    assert!(host.analysis("untitled:Untitled-1").is_resolved());
}

#[test]
fn test_imported_concepts_have_no_local_definition() {
    let dir = workspace();
    let uri = uri_in(dir.path(), "main.preql");
    let host = AnalysisHost::new();
    host.validate(uri.as_str(), MAIN);
    let analysis = host.analysis(uri.as_str());

    assert!(analysis.goto_definition(at("o.order_id", 0)).is_empty());

    let references = analysis.find_references(at("o.total", 0), true);
    assert_eq!(references.len(), 1);
    assert_eq!(references.address.as_deref(), Some("o.total"));
}

#[test]
fn test_import_hover() {
    let dir = workspace();
    let uri = uri_in(dir.path(), "main.preql");
    let host = AnalysisHost::new();
    host.validate(uri.as_str(), MAIN);

    let hover = host.analysis(uri.as_str()).hover(at("orders", 0)).unwrap();
    assert_eq!(
        hover.contents,
        "**import statement**\n\n**Path:** `orders`\n**Alias:** `o`\n\n\
         *Use `o.concept_name` to reference concepts from this import*"
    );
    assert_eq!((hover.start_line, hover.start_col), (0, 7));
    assert_eq!(hover.address, None);
}

#[test]
fn test_missing_import_keeps_syntax_features() {
    let dir = tempfile::tempdir().unwrap();
    let uri = uri_in(dir.path(), "main.preql");
    let host = AnalysisHost::new();

    // Semantic failures are not reported as diagnostics.
    assert!(host.validate(uri.as_str(), MAIN).is_empty());

    let analysis = host.analysis(uri.as_str());
    assert!(!analysis.is_resolved());
    assert!(analysis.metadata().is_empty());
    assert_eq!(analysis.document_symbols().len(), 1);

    let hover = analysis.hover(at("o.total", 0)).unwrap();
    assert_eq!(hover.contents, "**Concept:** `o.total`");
}
