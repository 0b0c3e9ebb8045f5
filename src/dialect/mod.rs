//! SQL rendering for compiled statements.
//!
//! A [`Dialect`] works in two steps: [`generate_queries`](Dialect::generate_queries)
//! plans each statement against the environment (datasource choice, joins,
//! grouping) and [`compile_statement`](Dialect::compile_statement) prints a
//! plan as SQL text.

mod duckdb;
mod plan;

pub use duckdb::DuckDbDialect;
pub use plan::{AlignColumn, CompiledForm, OutputColumn, SelectPlan, SourceRef};

use thiserror::Error;

use crate::semantic::{Environment, Statement};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No datasource binds a concept the query needs.
    #[error("No datasource provides '{concept}'")]
    NoDatasource { concept: String },

    /// A needed datasource shares no concept with the ones already chosen.
    #[error("No join path to datasource '{datasource}'")]
    NoJoinPath { datasource: String },

    #[error("Concept '{concept}' is not defined")]
    UnknownConcept { concept: String },

    #[error("Cannot render {kind} statements")]
    Unsupported { kind: &'static str },

    #[error("Function '{function}' expects {expected} arguments, got {found}")]
    Arity {
        function: String,
        expected: &'static str,
        found: usize,
    },
}

/// Renders statements to a SQL dialect.
pub trait Dialect: Send + Sync {
    /// Identifier passed to editor commands.
    fn name(&self) -> &'static str;

    /// Plan every renderable statement. Statements that are not queries
    /// (declarations, imports) produce no form.
    fn generate_queries(
        &self,
        env: &Environment,
        statements: &[Statement],
    ) -> Result<Vec<CompiledForm>, RenderError>;

    fn compile_statement(&self, form: &CompiledForm) -> Result<String, RenderError>;
}
