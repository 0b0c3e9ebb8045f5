//! Document outline tests.

use crate::helpers::analysis_helpers::*;
use crate::helpers::source_fixtures::*;
use tempfile::tempdir;
use trilogy_ls::ide::{AnalysisConfig, AnalysisHost, SymbolKind};

#[test]
fn test_outline_of_model() {
    let host = host_with(USERS_MODEL);
    let symbols = host.analysis(TEST_URI).document_symbols();

    let outline: Vec<(&str, SymbolKind, &str)> = symbols
        .iter()
        .map(|s| (s.name.as_str(), s.kind, s.detail.as_str()))
        .collect();
    assert_eq!(
        outline,
        vec![
            ("user_id", SymbolKind::Key, "key: int"),
            ("name", SymbolKind::Property, "property: string"),
            ("user_count", SymbolKind::Number, "metric: int"),
            ("users", SymbolKind::Struct, "datasource -> app.users"),
        ]
    );
    assert!(symbols.windows(2).all(|w| w[0].start_line <= w[1].start_line));
}

#[test]
fn test_outline_skips_unresolved_definitions() {
    let host = host_with(UNRESOLVED_REFERENCE);
    assert!(host.analysis(TEST_URI).document_symbols().is_empty());
}

#[test]
fn test_outline_includes_imports() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("dates.preql"), "key holiday date;\n").unwrap();

    let host =
        AnalysisHost::with_config(AnalysisConfig::default().with_working_path(dir.path())).unwrap();
    let source = "import dates as d;\nkey order_id int;\n";
    assert!(host.validate(TEST_URI, source).is_empty());

    let symbols = host.analysis(TEST_URI).document_symbols();
    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols[0].name, "d");
    assert_eq!(symbols[0].kind, SymbolKind::Module);
    assert_eq!(symbols[0].detail, "import dates");
    assert_eq!(symbols[1].name, "order_id");
}
