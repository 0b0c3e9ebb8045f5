//! Two-pass semantic build over one document.
//!
//! ```text
//! Empty ──declare──▶ StructurallyDeclared ──resolve──▶ Resolved
//!   │                        │
//!   └────────error───────────┴──────error──────▶ Failed
//! ```

use tracing::{debug, warn};

use super::metadata::{MetadataMap, build_metadata};
use crate::semantic::{Compiler, Environment, SemanticBuilder, SemanticError, Statement};
use crate::syntax::ParseTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverState {
    Empty,
    StructurallyDeclared,
    Resolved,
    Failed,
}

/// Drives a [`SemanticBuilder`] through both passes in order.
pub struct SemanticPass {
    builder: Box<dyn SemanticBuilder>,
    state: DriverState,
}

impl SemanticPass {
    pub fn new(compiler: &dyn Compiler, environment: Environment) -> Self {
        Self {
            builder: compiler.builder(environment),
            state: DriverState::Empty,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// First pass: register declarations and defer forward references.
    pub fn declare(&mut self, text: &str, tree: &ParseTree) -> Result<(), SemanticError> {
        if self.state != DriverState::Empty {
            return Err(SemanticError::NotPrepared);
        }
        self.builder.set_text(text);
        self.builder.prepare();
        match self.builder.transform(tree) {
            Ok(()) => {
                self.state = DriverState::StructurallyDeclared;
                Ok(())
            }
            Err(err) => {
                self.state = DriverState::Failed;
                Err(err)
            }
        }
    }

    /// Second pass: resolve deferred references and return the statements.
    pub fn resolve(&mut self) -> Result<Vec<Statement>, SemanticError> {
        if self.state != DriverState::StructurallyDeclared {
            return Err(SemanticError::NotPrepared);
        }
        match self.builder.run_second_pass() {
            Ok(statements) => {
                self.state = DriverState::Resolved;
                Ok(statements)
            }
            Err(err) => {
                self.state = DriverState::Failed;
                Err(err)
            }
        }
    }

    pub fn environment(&self) -> &Environment {
        self.builder.environment()
    }

    pub fn into_environment(self) -> Environment {
        self.builder.into_environment()
    }
}

/// Everything one semantic build produced.
///
/// On failure the metadata and statements are empty; the environment is
/// whatever the builder had registered before the error.
#[derive(Debug)]
pub struct PassOutcome {
    pub state: DriverState,
    pub metadata: MetadataMap,
    pub statements: Vec<Statement>,
    pub environment: Environment,
    pub error: Option<SemanticError>,
}

impl PassOutcome {
    pub fn is_resolved(&self) -> bool {
        self.state == DriverState::Resolved
    }
}

/// Run both passes and extract metadata. Semantic errors are logged and
/// reported on the outcome, never propagated.
pub fn run_semantic_pass(
    compiler: &dyn Compiler,
    environment: Environment,
    text: &str,
    tree: &ParseTree,
) -> PassOutcome {
    let mut pass = SemanticPass::new(compiler, environment);
    let result = pass.declare(text, tree).and_then(|()| pass.resolve());
    let state = pass.state();
    let environment = pass.into_environment();

    match result {
        Ok(statements) => {
            let metadata = build_metadata(&environment);
            debug!(
                "Semantic pass resolved {} statements, {} concepts",
                statements.len(),
                metadata.len()
            );
            PassOutcome {
                state,
                metadata,
                statements,
                environment,
                error: None,
            }
        }
        Err(err) => {
            warn!("Semantic pass failed: {err}");
            PassOutcome {
                state,
                metadata: MetadataMap::new(),
                statements: Vec::new(),
                environment,
                error: Some(err),
            }
        }
    }
}
