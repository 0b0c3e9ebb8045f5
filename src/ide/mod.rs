//! IDE features: high-level APIs for editor-protocol handlers.
//!
//! This module sits between the symbol index (HIR) and an editor server.
//! Each query function corresponds to one editor request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take a snapshot in, return data out
//! 2. **No protocol types**: Uses our own types, converted at the protocol boundary
//! 3. **Whole-document validation**: every change rebuilds one [`DocumentSnapshot`]
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```
//! use trilogy_ls::ide::AnalysisHost;
//!
//! let host = AnalysisHost::new();
//! host.validate("file:///shop.preql", "key order_id int;\n");
//!
//! let analysis = host.analysis("file:///shop.preql");
//! assert_eq!(analysis.document_symbols().len(), 1);
//! ```

mod analysis;
mod completion;
mod config;
mod functions;
mod goto;
mod hover;
mod references;
mod semantic_tokens;
mod signature_help;
mod snapshot;
mod symbols;
pub mod text_utils;

pub use analysis::{Analysis, AnalysisHost};
pub use completion::{CompletionItem, CompletionKind, KEYWORDS, completions};
pub use config::{AnalysisConfig, AnalysisError, SETTINGS_SECTION};
pub use functions::{FunctionInfo, ParameterInfo, TRILOGY_FUNCTIONS, lookup_function};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use hover::{HoverResult, format_concept, format_datasource, format_import, hover};
pub use references::{Reference, ReferenceResult, find_references};
pub use semantic_tokens::{SemanticToken, TokenType, encode_deltas, modifiers, semantic_tokens};
pub use signature_help::{SignatureHelp, signature_help};
pub use snapshot::DocumentSnapshot;
pub use symbols::{SymbolInfo, SymbolKind, document_symbols};
pub use text_utils::{extract_word_at_cursor, find_open_call};
