//! Helpers for building analyses from source text.

use trilogy_ls::DocumentId;
use trilogy_ls::hir::{MetadataMap, SymbolLocation, extract, run_semantic_pass};
use trilogy_ls::ide::AnalysisHost;
use trilogy_ls::parser::{SourceParser, TrilogyParser};
use trilogy_ls::semantic::{DEFAULT_NAMESPACE, Environment, TrilogyCompiler};

pub const TEST_URI: &str = "file:///workspace/test.preql";

/// Validate `source` in a fresh host under [`TEST_URI`].
pub fn host_with(source: &str) -> AnalysisHost {
    let host = AnalysisHost::new();
    host.validate(TEST_URI, source);
    host
}

pub fn test_document() -> DocumentId {
    DocumentId::from(TEST_URI)
}

/// Locations of `source` with the default namespace. Panics if it does not parse.
pub fn locations_of(source: &str) -> Vec<SymbolLocation> {
    let tree = TrilogyParser.parse(source).expect("source should parse");
    extract(&tree, DEFAULT_NAMESPACE)
}

/// Metadata from a full semantic pass over `source`.
pub fn metadata_of(source: &str) -> MetadataMap {
    let tree = TrilogyParser.parse(source).expect("source should parse");
    let outcome = run_semantic_pass(&TrilogyCompiler::default(), Environment::new(), source, &tree);
    assert!(outcome.error.is_none(), "semantic pass failed: {:?}", outcome.error);
    outcome.metadata
}

/// 0-indexed (line, column) of the `nth` occurrence of `needle`.
pub fn position_of(source: &str, needle: &str, nth: usize) -> (u32, u32) {
    let offset = source
        .match_indices(needle)
        .nth(nth)
        .map(|(i, _)| i)
        .expect("needle should occur in source");
    let before = &source[..offset];
    let line = before.matches('\n').count() as u32;
    let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) as u32;
    (line, column)
}
