//! Host lifecycle: cancellation, parallel validation, close and configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::helpers::analysis_helpers::*;
use crate::helpers::source_fixtures::*;
use serde_json::json;
use trilogy_ls::DocumentId;
use trilogy_ls::base::Position;
use trilogy_ls::dialect::DuckDbDialect;
use trilogy_ls::ide::{AnalysisConfig, AnalysisError, AnalysisHost};
use trilogy_ls::parser::{ParseFailure, SourceParser, TrilogyParser};
use trilogy_ls::semantic::{FsImportLoader, TrilogyCompiler};
use trilogy_ls::syntax::ParseTree;

const FIRST: &str = "key first int;\n";
const SECOND: &str = "key second int;\nselect second;\n";

/// Parses like the built-in parser, but the first parse of `gated` waits
/// until the test releases it.
struct GatedParser {
    gated: &'static str,
    armed: AtomicBool,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl SourceParser for GatedParser {
    fn parse(&self, text: &str) -> Result<ParseTree, ParseFailure> {
        if text == self.gated && self.armed.swap(false, Ordering::SeqCst) {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
        }
        TrilogyParser.parse(text)
    }
}

/// Host whose first parse of [`FIRST`] blocks, plus the test's ends of the gate.
fn gated_host() -> (AnalysisHost, Receiver<()>, Sender<()>) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let parser: Arc<dyn SourceParser> = Arc::new(GatedParser {
        gated: FIRST,
        armed: AtomicBool::new(true),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let compiler = Arc::new(TrilogyCompiler::new(parser.clone(), Arc::new(FsImportLoader)));
    let host = AnalysisHost::with_collaborators(
        parser,
        compiler,
        Arc::new(DuckDbDialect),
        AnalysisConfig::default(),
    );
    (host, entered_rx, release_tx)
}

// ============================================================================
// CANCELLATION
// ============================================================================

#[test]
fn test_newer_validation_supersedes_running_one() {
    let (host, entered, release) = gated_host();
    let document = test_document();

    let first = thread::scope(|scope| {
        let handle = scope.spawn(|| host.try_validate(TEST_URI, FIRST));
        entered.recv().unwrap();

        let diagnostics = host.try_validate(TEST_URI, SECOND).unwrap();
        assert!(diagnostics.is_empty());

        release.send(()).unwrap();
        handle.join().unwrap()
    });

    assert_eq!(
        first,
        Err(AnalysisError::Cancelled {
            document: document.clone()
        })
    );
    let analysis = host.analysis(TEST_URI);
    assert_eq!(analysis.text(), SECOND);
    assert!(analysis.resolve("local.second").is_some());
    assert!(analysis.resolve("local.first").is_none());
}

#[test]
fn test_cancelled_validation_reports_no_diagnostics() {
    let (host, entered, release) = gated_host();

    let first = thread::scope(|scope| {
        let handle = scope.spawn(|| host.validate(TEST_URI, FIRST));
        entered.recv().unwrap();
        host.cancel(&test_document());
        release.send(()).unwrap();
        handle.join().unwrap()
    });

    assert!(first.is_empty());
    assert!(!host.is_open(&test_document()));
}

#[test]
fn test_cancel_without_running_validation_is_noop() {
    let host = host_with(KEY_PROPERTY_SELECT);
    host.cancel(&test_document());
    host.cancel(&DocumentId::from("file:///never-opened.preql"));
    assert_eq!(host.analysis(TEST_URI).text(), KEY_PROPERTY_SELECT);
}

// ============================================================================
// PARALLEL VALIDATION
// ============================================================================

#[test]
fn test_validate_all() {
    let host = AnalysisHost::new();
    let documents: Vec<(DocumentId, String)> = (0..8)
        .map(|i| {
            let uri = DocumentId::from(format!("file:///workspace/model_{i}.preql"));
            let text = if i == 3 {
                UNPARSABLE.to_string()
            } else {
                format!("key id_{i} int;\nselect id_{i};\n")
            };
            (uri, text)
        })
        .collect();

    let results = host.validate_all(&documents);
    assert_eq!(results.len(), 8);
    for (document, diagnostics) in &results {
        let broken = document.as_str().ends_with("model_3.preql");
        assert_eq!(diagnostics.is_empty(), !broken, "{document}");
    }

    assert_eq!(host.documents().len(), 8);
    let analysis = host.analysis("file:///workspace/model_5.preql");
    assert!(analysis.resolve("local.id_5").is_some());
    assert!(analysis.resolve("local.id_4").is_none());
}

// ============================================================================
// DOCUMENT LIFECYCLE
// ============================================================================

#[test]
fn test_open_close_documents() {
    let host = AnalysisHost::new();
    host.validate("file:///b.preql", "key b int;\n");
    host.validate("file:///a.preql", "key a int;\n");

    assert_eq!(
        host.documents(),
        vec![DocumentId::from("file:///a.preql"), DocumentId::from("file:///b.preql")]
    );

    let a = DocumentId::from("file:///a.preql");
    host.close(&a);
    assert!(!host.is_open(&a));
    assert!(host.is_open(&DocumentId::from("file:///b.preql")));
    assert!(host.analysis("file:///a.preql").document_symbols().is_empty());
}

#[test]
fn test_revalidation_replaces_snapshot() {
    let host = host_with(KEY_PROPERTY_SELECT);
    let before = host.snapshot(&test_document()).unwrap();

    host.validate(TEST_URI, UNPARSABLE);
    let after = host.analysis(TEST_URI);
    assert_eq!(after.diagnostics().len(), 1);
    assert!(after.locations().is_empty());

    // Handles taken earlier keep the old view.
    assert_eq!(before.index.len(), 3);
}

#[test]
fn test_read_models() {
    let host = host_with(USERS_QUERIES);
    let analysis = host.analysis(TEST_URI);

    assert!(analysis.is_resolved());
    assert_eq!(analysis.lenses().len(), 3);
    assert_eq!(analysis.datasources().len(), 1);
    assert!(analysis.imports().is_empty());

    let tokens = analysis.semantic_tokens();
    let data = analysis.semantic_token_data();
    assert!(!tokens.is_empty());
    assert_eq!(data.len(), tokens.len() * 5);
    // First token is the `key` keyword at the start of the document.
    assert_eq!(&data[..3], &[0, 0, 3]);

    let symbol = analysis.symbol_at(Position::new(9, 8)).unwrap();
    assert_eq!(symbol.address, "local.name");
    assert!(!symbol.is_definition);
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_host_from_editor_settings() {
    let config = AnalysisConfig::from_settings(&json!({
        "trilogy": { "defaultNamespace": "shop", "hoverLineageLimit": 8 }
    }))
    .unwrap();
    let host = AnalysisHost::with_config(config).unwrap();
    host.validate(TEST_URI, "key order_id int;\nmetric orders <- count(order_id);\n");

    let analysis = host.analysis(TEST_URI);
    let hover = analysis.hover(Position::new(1, 8)).unwrap();
    assert!(hover.is_definition);
    assert!(hover.contents.contains("**Derivation:** `count...`"), "{}", hover.contents);
    assert!(hover.contents.contains("**Namespace:** `local`"));
}

#[test]
fn test_set_config_rejects_unknown_dialect() {
    let mut host = AnalysisHost::new();
    let err = host
        .set_config(AnalysisConfig::default().with_dialect("oracle"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedDialect { .. }));
    assert_eq!(host.config().dialect, "duckdb");

    host.set_config(AnalysisConfig::default().with_hover_lineage_limit(12))
        .unwrap();
    assert_eq!(host.config().hover_lineage_limit, 12);
}
