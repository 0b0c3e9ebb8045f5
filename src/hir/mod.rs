//! Symbol index over one Trilogy document.
//!
//! Everything here is rebuilt from scratch on each validation: there is no
//! incremental state.
//!
//! ## Key Types
//!
//! - [`SymbolLocation`]: an identifier occurrence that names a concept
//! - [`PositionIndex`]: containment and address queries over locations
//! - [`SymbolMetadata`]: what the semantic model knows about a symbol
//! - [`Lens`]: a runnable-statement action anchored to a source line
//!
//! ## Pipeline
//!
//! ```text
//! ParseTree ──extract──────────────▶ PositionIndex ─┐
//!     │                                             ├─ resolve(address) ─▶ SymbolMetadata
//!     ├──run_semantic_pass──▶ MetadataMap ──────────┘
//!     │          └──────────▶ statements ──build_lenses──▶ [Lens]
//!     └──extract_datasources / extract_imports──▶ structure info
//! ```

mod diagnostics;
mod driver;
mod index;
mod lenses;
mod locations;
mod metadata;
mod resolve;
mod structure;

pub use diagnostics::{Diagnostic, Severity, parse_diagnostics};
pub use driver::{DriverState, PassOutcome, SemanticPass, run_semantic_pass};
pub use index::PositionIndex;
pub use lenses::{
    Lens, LensFailure, LensOutcome, RENDER_QUERY_COMMAND, RUN_QUERY_COMMAND, build_lenses,
    statement_lenses,
};
pub use locations::{SymbolLocation, extract};
pub use metadata::{
    ConceptView, DefinitionSite, ExtractionOutcome, MetadataField, MetadataMap, Role,
    SymbolGraph, SymbolMetadata, build_metadata, extract_one,
};
pub use resolve::{resolve, resolve_address};
pub use structure::{DataSourceInfo, ImportInfo, extract_datasources, extract_imports};
