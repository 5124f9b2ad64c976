//! Permissions policy documents read from disk

use std::fs;
use std::path::{Path, PathBuf};

use strata_core::error::{DefinitionError, DefinitionResult};

/// A JSON policy document, kept exactly as written in its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    path: PathBuf,
    content: String,
}

impl PolicyDocument {
    /// Read and syntax-check a policy file
    pub fn load(path: impl AsRef<Path>) -> DefinitionResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DefinitionError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str::<serde_json::Value>(&content).map_err(|e| {
            DefinitionError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}
