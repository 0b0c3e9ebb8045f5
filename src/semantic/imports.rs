//! Import source loading.

use std::path::{Path, PathBuf};

use super::error::SemanticError;

/// File extension of Trilogy sources.
pub const SOURCE_EXTENSION: &str = "preql";

/// Fetches the text of an imported module.
pub trait ImportLoader: Send + Sync {
    fn load(&self, path: &str, working_path: Option<&Path>) -> Result<String, SemanticError>;
}

/// Resolves `a.b` to `<working_path>/a/b.preql` on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImportLoader;

impl FsImportLoader {
    pub fn file_for(path: &str, working_path: &Path) -> PathBuf {
        let mut file = working_path.to_path_buf();
        for segment in path.split('.') {
            file.push(segment);
        }
        file.set_extension(SOURCE_EXTENSION);
        file
    }
}

impl ImportLoader for FsImportLoader {
    fn load(&self, path: &str, working_path: Option<&Path>) -> Result<String, SemanticError> {
        let working_path = working_path.ok_or_else(|| SemanticError::ImportNotFound {
            path: path.to_string(),
            reason: "no working path configured".to_string(),
        })?;
        let file = Self::file_for(path, working_path);
        tracing::trace!("Loading import {} from {}", path, file.display());
        std::fs::read_to_string(&file).map_err(|e| SemanticError::ImportNotFound {
            path: path.to_string(),
            reason: format!("{}: {e}", file.display()),
        })
    }
}
