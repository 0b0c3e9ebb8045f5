//! AnalysisHost and Analysis: per-document state for editor features.
//!
//! The `AnalysisHost` validates documents and owns their snapshots; an
//! `Analysis` is a cheap read handle on one snapshot, so every query made
//! through it sees the same validation.
//!
//! ## Usage
//!
//! ```
//! use trilogy_ls::base::Position;
//! use trilogy_ls::ide::AnalysisHost;
//!
//! let host = AnalysisHost::new();
//! let diagnostics = host.validate("file:///orders.preql", "key order_id int;\nselect order_id;\n");
//! assert!(diagnostics.is_empty());
//!
//! let analysis = host.analysis("file:///orders.preql");
//! let hover = analysis.hover(Position::new(1, 8)).unwrap();
//! assert_eq!(hover.address.as_deref(), Some("local.order_id"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::base::{DocumentId, Position};
use crate::dialect::{Dialect, DuckDbDialect};
use crate::hir::{
    DataSourceInfo, Diagnostic, ImportInfo, Lens, MetadataMap, SymbolLocation, SymbolMetadata,
    resolve,
};
use crate::parser::{SourceParser, TrilogyParser};
use crate::semantic::{Compiler, FsImportLoader, TrilogyCompiler};

use super::config::{AnalysisConfig, AnalysisError};
use super::semantic_tokens::encode_deltas;
use super::snapshot::{DocumentSnapshot, Pipeline};
use super::{
    CompletionItem, GotoResult, HoverResult, ReferenceResult, SemanticToken, SignatureHelp,
    SymbolInfo,
};

/// A validation that has started but not yet published.
struct Inflight {
    generation: u64,
    token: CancellationToken,
}

/// Validates documents and holds their latest snapshots.
///
/// All methods take `&self`; different documents may be validated from
/// different threads at once. Starting a validation cancels any unfinished
/// validation of the same document, and a cancelled validation never
/// replaces the published snapshot.
pub struct AnalysisHost {
    parser: Arc<dyn SourceParser>,
    compiler: Arc<dyn Compiler>,
    dialect: Arc<dyn Dialect>,
    config: AnalysisConfig,
    documents: RwLock<FxHashMap<DocumentId, Arc<DocumentSnapshot>>>,
    inflight: Mutex<FxHashMap<DocumentId, Inflight>>,
    next_generation: AtomicU64,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// Host with the built-in parser, compiler and DuckDB renderer.
    pub fn new() -> Self {
        Self::builtin(Arc::new(DuckDbDialect), AnalysisConfig::default())
    }

    /// Host with the built-in collaborators and the given configuration.
    pub fn with_config(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let dialect = config.dialect_renderer()?;
        Ok(Self::builtin(dialect, config))
    }

    fn builtin(dialect: Arc<dyn Dialect>, config: AnalysisConfig) -> Self {
        let parser: Arc<dyn SourceParser> = Arc::new(TrilogyParser);
        let compiler = Arc::new(TrilogyCompiler::new(parser.clone(), Arc::new(FsImportLoader)));
        Self::with_collaborators(parser, compiler, dialect, config)
    }

    /// Host with injected collaborators.
    pub fn with_collaborators(
        parser: Arc<dyn SourceParser>,
        compiler: Arc<dyn Compiler>,
        dialect: Arc<dyn Dialect>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            parser,
            compiler,
            dialect,
            config,
            documents: RwLock::new(FxHashMap::default()),
            inflight: Mutex::new(FxHashMap::default()),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Replace the configuration. Published snapshots are kept until their
    /// documents are validated again.
    pub fn set_config(&mut self, config: AnalysisConfig) -> Result<(), AnalysisError> {
        self.dialect = config.dialect_renderer()?;
        self.config = config;
        Ok(())
    }

    // ==================== Validation ====================

    /// Re-index a document from its full text and return its diagnostics.
    ///
    /// A validation superseded by a newer one for the same document returns
    /// no diagnostics and publishes nothing.
    pub fn validate(&self, document: impl Into<DocumentId>, text: &str) -> Vec<Diagnostic> {
        match self.try_validate(document, text) {
            Ok(diagnostics) => diagnostics,
            Err(err) => {
                debug!("{err}");
                Vec::new()
            }
        }
    }

    /// Like [`validate`](Self::validate), reporting cancellation as an error.
    pub fn try_validate(
        &self,
        document: impl Into<DocumentId>,
        text: &str,
    ) -> Result<Vec<Diagnostic>, AnalysisError> {
        let document = document.into();
        let (generation, token) = self.begin(&document);

        let pipeline = Pipeline {
            parser: self.parser.as_ref(),
            compiler: self.compiler.as_ref(),
            dialect: self.dialect.as_ref(),
            config: &self.config,
        };
        let result = pipeline
            .build(&document, text, &token)
            .and_then(|snapshot| self.publish(&document, &token, snapshot));

        self.finish(&document, generation);
        result
    }

    /// Validate several documents in parallel.
    pub fn validate_all(
        &self,
        documents: &[(DocumentId, String)],
    ) -> Vec<(DocumentId, Vec<Diagnostic>)> {
        documents
            .par_iter()
            .map(|(document, text)| {
                let diagnostics = self.validate(document.clone(), text);
                (document.clone(), diagnostics)
            })
            .collect()
    }

    /// Cancel an unfinished validation of `document`, if any.
    pub fn cancel(&self, document: &DocumentId) {
        if let Some(inflight) = self.inflight.lock().get(document) {
            trace!("Cancelling validation {} of {document}", inflight.generation);
            inflight.token.cancel();
        }
    }

    /// Forget a document, cancelling any validation still running for it.
    pub fn close(&self, document: &DocumentId) {
        self.cancel(document);
        self.documents.write().remove(document);
    }

    fn begin(&self, document: &DocumentId) -> (u64, CancellationToken) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let previous = self.inflight.lock().insert(
            document.clone(),
            Inflight {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            trace!(
                "Validation {generation} of {document} supersedes {}",
                previous.generation
            );
            previous.token.cancel();
        }
        (generation, token)
    }

    /// Swap the snapshot in unless the validation was cancelled. The check
    /// happens under the write lock so a superseded validation cannot
    /// overwrite a newer snapshot.
    fn publish(
        &self,
        document: &DocumentId,
        token: &CancellationToken,
        snapshot: DocumentSnapshot,
    ) -> Result<Vec<Diagnostic>, AnalysisError> {
        let mut documents = self.documents.write();
        if token.is_cancelled() {
            debug!("Dropping cancelled validation of {document}");
            return Err(AnalysisError::Cancelled {
                document: document.clone(),
            });
        }
        let diagnostics = snapshot.diagnostics.clone();
        documents.insert(document.clone(), Arc::new(snapshot));
        Ok(diagnostics)
    }

    fn finish(&self, document: &DocumentId, generation: u64) {
        let mut inflight = self.inflight.lock();
        if inflight
            .get(document)
            .is_some_and(|current| current.generation == generation)
        {
            inflight.remove(document);
        }
    }

    // ==================== Reads ====================

    /// Latest published snapshot of `document`.
    pub fn snapshot(&self, document: &DocumentId) -> Option<Arc<DocumentSnapshot>> {
        self.documents.read().get(document).cloned()
    }

    pub fn is_open(&self, document: &DocumentId) -> bool {
        self.documents.read().contains_key(document)
    }

    /// Documents with a published snapshot, sorted.
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut documents: Vec<_> = self.documents.read().keys().cloned().collect();
        documents.sort();
        documents
    }

    /// Read handle on the latest snapshot of `document`. Unknown documents
    /// get an empty snapshot, so every query answers empty or `None`.
    pub fn analysis(&self, document: impl Into<DocumentId>) -> Analysis<'_> {
        let snapshot = self.snapshot(&document.into()).unwrap_or_default();
        Analysis {
            snapshot,
            config: &self.config,
        }
    }
}

/// An immutable view of one document's analysis.
///
/// All IDE queries go through this struct to ensure consistent results.
pub struct Analysis<'a> {
    snapshot: Arc<DocumentSnapshot>,
    config: &'a AnalysisConfig,
}

impl Analysis<'_> {
    // ==================== Read models ====================

    pub fn snapshot(&self) -> &DocumentSnapshot {
        &self.snapshot
    }

    pub fn text(&self) -> &str {
        &self.snapshot.text
    }

    pub fn is_resolved(&self) -> bool {
        self.snapshot.is_resolved()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.snapshot.diagnostics
    }

    pub fn locations(&self) -> &[SymbolLocation] {
        self.snapshot.index.locations()
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.snapshot.metadata
    }

    pub fn datasources(&self) -> &[DataSourceInfo] {
        &self.snapshot.datasources
    }

    pub fn imports(&self) -> &[ImportInfo] {
        &self.snapshot.imports
    }

    pub fn lenses(&self) -> &[Lens] {
        &self.snapshot.lenses
    }

    pub fn semantic_tokens(&self) -> &[SemanticToken] {
        &self.snapshot.tokens
    }

    /// Semantic tokens in the relative encoding editors expect.
    pub fn semantic_token_data(&self) -> Vec<u32> {
        encode_deltas(&self.snapshot.tokens)
    }

    // ==================== Queries ====================

    /// Location under a 0-indexed position.
    pub fn symbol_at(&self, position: Position) -> Option<&SymbolLocation> {
        self.snapshot.index.find_containing(position)
    }

    /// Metadata for a raw or canonical address.
    pub fn resolve(&self, address: &str) -> Option<&SymbolMetadata> {
        resolve(address, &self.snapshot.metadata)
    }

    pub fn hover(&self, position: Position) -> Option<HoverResult> {
        super::hover(&self.snapshot, position, self.config)
    }

    pub fn goto_definition(&self, position: Position) -> GotoResult {
        super::goto_definition(&self.snapshot, position)
    }

    pub fn find_references(&self, position: Position, include_declaration: bool) -> ReferenceResult {
        super::find_references(&self.snapshot, position, include_declaration)
    }

    pub fn document_symbols(&self) -> Vec<SymbolInfo> {
        super::document_symbols(
            &self.snapshot.index,
            &self.snapshot.metadata,
            &self.snapshot.datasources,
            &self.snapshot.imports,
        )
    }

    pub fn completions(&self) -> Vec<CompletionItem> {
        super::completions(&self.snapshot.metadata, &self.snapshot.datasources, self.config)
    }

    pub fn signature_help(&self, position: Position) -> Option<SignatureHelp> {
        super::signature_help(&self.snapshot.text, position)
    }
}
