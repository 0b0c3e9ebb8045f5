//! Per-document read models built by one validation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::config::{AnalysisConfig, AnalysisError};
use super::semantic_tokens::{SemanticToken, semantic_tokens};
use crate::base::DocumentId;
use crate::dialect::Dialect;
use crate::hir::{
    DataSourceInfo, Diagnostic, DriverState, ImportInfo, Lens, MetadataMap, PositionIndex,
    build_lenses, extract, extract_datasources, extract_imports, parse_diagnostics,
    run_semantic_pass,
};
use crate::parser::SourceParser;
use crate::semantic::{Compiler, Environment};

/// Everything the editor features read for one document.
///
/// Built in full by a validation and swapped in as a unit, so readers never
/// see artifacts from two different validations.
#[derive(Debug, Clone, Default)]
pub struct DocumentSnapshot {
    pub text: Arc<str>,
    pub state: Option<DriverState>,
    pub index: PositionIndex,
    pub metadata: MetadataMap,
    pub datasources: Vec<DataSourceInfo>,
    pub imports: Vec<ImportInfo>,
    pub lenses: Vec<Lens>,
    pub diagnostics: Vec<Diagnostic>,
    pub tokens: Vec<SemanticToken>,
}

impl DocumentSnapshot {
    /// Whether semantic resolution succeeded for this text.
    pub fn is_resolved(&self) -> bool {
        self.state == Some(DriverState::Resolved)
    }
}

/// Collaborators a validation runs against.
pub(crate) struct Pipeline<'a> {
    pub parser: &'a dyn SourceParser,
    pub compiler: &'a dyn Compiler,
    pub dialect: &'a dyn Dialect,
    pub config: &'a AnalysisConfig,
}

impl Pipeline<'_> {
    /// Run the whole pipeline over `text`, checking `cancel` between stages.
    pub(crate) fn build(
        &self,
        document: &DocumentId,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<DocumentSnapshot, AnalysisError> {
        let checkpoint = || {
            if cancel.is_cancelled() {
                debug!("Validation of {document} cancelled");
                Err(AnalysisError::Cancelled {
                    document: document.clone(),
                })
            } else {
                Ok(())
            }
        };

        let tree = match self.parser.parse(text) {
            Ok(tree) => tree,
            Err(failure) => {
                let diagnostics = parse_diagnostics(&failure);
                debug!("{document}: {} parse errors", diagnostics.len());
                return Ok(DocumentSnapshot {
                    text: text.into(),
                    diagnostics,
                    ..DocumentSnapshot::default()
                });
            }
        };
        checkpoint()?;

        let index = PositionIndex::new(extract(&tree, &self.config.default_namespace));
        let datasources = extract_datasources(&tree);
        let imports = extract_imports(&tree);
        let tokens = semantic_tokens(&tree);
        debug!(
            "{document}: {} locations, {} datasources, {} imports",
            index.len(),
            datasources.len(),
            imports.len()
        );
        checkpoint()?;

        let mut environment = Environment::new();
        if let Some(path) = self.working_path(document) {
            environment = environment.with_working_path(path);
        }
        let outcome = run_semantic_pass(self.compiler, environment, text, &tree);
        checkpoint()?;

        let lenses = if outcome.is_resolved() {
            build_lenses(&outcome.statements, &outcome.environment, self.dialect)
        } else {
            Vec::new()
        };
        debug!(
            "{document}: {} concepts, {} lenses",
            outcome.metadata.len(),
            lenses.len()
        );

        Ok(DocumentSnapshot {
            text: text.into(),
            state: Some(outcome.state),
            index,
            metadata: outcome.metadata,
            datasources,
            imports,
            lenses,
            diagnostics: Vec::new(),
            tokens,
        })
    }

    fn working_path(&self, document: &DocumentId) -> Option<PathBuf> {
        if let Some(path) = &self.config.working_path {
            return Some(path.clone());
        }
        document_directory(document.as_str())
    }
}

/// Directory containing a `file://` URI or plain path.
fn document_directory(document: &str) -> Option<PathBuf> {
    let path = match document.strip_prefix("file://") {
        Some(rest) => rest,
        None if document.contains("://") => return None,
        None => document,
    };
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_directory() {
        assert_eq!(
            document_directory("file:///work/models/orders.preql"),
            Some(PathBuf::from("/work/models"))
        );
        assert_eq!(
            document_directory("/work/orders.preql"),
            Some(PathBuf::from("/work"))
        );
        assert_eq!(document_directory("untitled:Untitled-1"), None);
        assert_eq!(document_directory("orders.preql"), None);
    }
}
