//! Analysis configuration and errors.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::base::DocumentId;
use crate::dialect::{Dialect, DuckDbDialect};
use crate::semantic::DEFAULT_NAMESPACE;

/// Settings section the editor sends configuration under.
pub const SETTINGS_SECTION: &str = "trilogy";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A newer validation of the same document superseded this one.
    #[error("validation of {document} was cancelled")]
    Cancelled { document: DocumentId },

    /// A configuration value had the wrong shape.
    #[error("invalid setting: {message}")]
    InvalidSetting { message: String },

    #[error("unsupported dialect '{name}'")]
    UnsupportedDialect { name: String },
}

/// Knobs for indexing and editor features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Namespace for unqualified names in the document.
    pub default_namespace: String,
    /// Directory imports resolve against. When unset, the directory of the
    /// document itself is used where the document id is a path.
    pub working_path: Option<PathBuf>,
    /// Longest derivation shown in hovers before truncation.
    pub hover_lineage_limit: usize,
    /// Longest derivation shown in completion docs before truncation.
    pub completion_lineage_limit: usize,
    pub dialect: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            working_path: None,
            hover_lineage_limit: 100,
            completion_lineage_limit: 50,
            dialect: "duckdb".to_string(),
        }
    }
}

/// Editor-side spelling of the settings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Settings {
    default_namespace: Option<String>,
    working_path: Option<PathBuf>,
    hover_lineage_limit: Option<usize>,
    completion_lineage_limit: Option<usize>,
    dialect: Option<String>,
}

impl AnalysisConfig {
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    pub fn with_working_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_path = Some(path.into());
        self
    }

    pub fn with_hover_lineage_limit(mut self, limit: usize) -> Self {
        self.hover_lineage_limit = limit;
        self
    }

    pub fn with_completion_lineage_limit(mut self, limit: usize) -> Self {
        self.completion_lineage_limit = limit;
        self
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    /// Apply editor settings on top of the defaults.
    ///
    /// Accepts either the `trilogy` section itself or an object containing
    /// it. Unknown keys are ignored.
    pub fn from_settings(settings: &serde_json::Value) -> Result<Self, AnalysisError> {
        let section = settings.get(SETTINGS_SECTION).unwrap_or(settings);
        if section.is_null() {
            return Ok(Self::default());
        }
        let parsed = Settings::deserialize(section).map_err(|err| {
            AnalysisError::InvalidSetting {
                message: err.to_string(),
            }
        })?;

        let mut config = Self::default();
        if let Some(namespace) = parsed.default_namespace {
            config.default_namespace = namespace;
        }
        config.working_path = parsed.working_path;
        if let Some(limit) = parsed.hover_lineage_limit {
            config.hover_lineage_limit = limit;
        }
        if let Some(limit) = parsed.completion_lineage_limit {
            config.completion_lineage_limit = limit;
        }
        if let Some(dialect) = parsed.dialect {
            config.dialect = dialect;
        }
        config.dialect_renderer()?;
        Ok(config)
    }

    /// Renderer for the configured dialect.
    pub fn dialect_renderer(&self) -> Result<Arc<dyn Dialect>, AnalysisError> {
        match self.dialect.to_ascii_lowercase().as_str() {
            "duckdb" => Ok(Arc::new(DuckDbDialect)),
            _ => Err(AnalysisError::UnsupportedDialect {
                name: self.dialect.clone(),
            }),
        }
    }
}
