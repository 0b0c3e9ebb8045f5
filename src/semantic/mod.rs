//! # Semantic Compilation
//!
//! Turns a [`ParseTree`](crate::syntax::ParseTree) into an [`Environment`]
//! of concepts and datasources plus an ordered list of [`Statement`]s.
//!
//! Compilation is two-phase so that a statement may refer to a concept
//! declared further down the document:
//!
//! ```text
//! set_text → prepare → transform(tree)   (declarations, imports, deferrals)
//!                    → run_second_pass() (deferred references, statements)
//! ```
//!
//! The index and editor layers only talk to the [`Compiler`] and
//! [`SemanticBuilder`] traits.

mod builder;
mod concept;
mod environment;
mod error;
mod expr;
mod imports;
mod statements;

use std::sync::Arc;

pub use builder::StatementBuilder;
pub use concept::{
    Concept, ConceptMetadata, ConceptSource, DataType, Derivation, Modifier, Purpose,
    requalify_address,
};
pub use environment::{
    ColumnAssignment, DEFAULT_NAMESPACE, Datasource, DatasourceAddress, Environment,
    INTERNAL_NAMESPACE, ImportRecord,
};
pub use error::SemanticError;
pub use expr::{BinaryOp, Expr, KNOWN_FUNCTIONS, Literal, UnaryOp, is_aggregate_function};
pub use imports::{FsImportLoader, ImportLoader, SOURCE_EXTENSION};
pub use statements::{
    AlignItem, MultiSelectStatement, OrderItem, PersistStatement, RawSqlStatement, SelectItem,
    SelectStatement, Statement, StatementMeta,
};

use crate::parser::{SourceParser, TrilogyParser};
use crate::syntax::ParseTree;

/// A single compilation of one document.
pub trait SemanticBuilder: Send {
    /// Source text, used for trailing-comment descriptions.
    fn set_text(&mut self, text: &str);

    /// Reset per-parse state. Must be called before [`transform`](Self::transform).
    fn prepare(&mut self);

    /// First pass: register declarations and defer what cannot resolve yet.
    fn transform(&mut self, tree: &ParseTree) -> Result<(), SemanticError>;

    /// Second pass: resolve deferred references and return the statements
    /// in document order.
    fn run_second_pass(&mut self) -> Result<Vec<Statement>, SemanticError>;

    fn environment(&self) -> &Environment;

    fn into_environment(self: Box<Self>) -> Environment;
}

/// Creates a [`SemanticBuilder`] per validation.
pub trait Compiler: Send + Sync {
    fn builder(&self, environment: Environment) -> Box<dyn SemanticBuilder>;
}

/// The built-in compiler.
#[derive(Clone)]
pub struct TrilogyCompiler {
    parser: Arc<dyn SourceParser>,
    loader: Arc<dyn ImportLoader>,
}

impl TrilogyCompiler {
    pub fn new(parser: Arc<dyn SourceParser>, loader: Arc<dyn ImportLoader>) -> Self {
        Self { parser, loader }
    }
}

impl Default for TrilogyCompiler {
    fn default() -> Self {
        Self::new(Arc::new(TrilogyParser), Arc::new(FsImportLoader))
    }
}

impl std::fmt::Debug for TrilogyCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrilogyCompiler").finish_non_exhaustive()
    }
}

impl Compiler for TrilogyCompiler {
    fn builder(&self, environment: Environment) -> Box<dyn SemanticBuilder> {
        Box::new(StatementBuilder::new(
            environment,
            self.parser.clone(),
            self.loader.clone(),
        ))
    }
}
