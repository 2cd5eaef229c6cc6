//! Catálogo lido de um arquivo JSON local.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::types::CatalogEntry;
use crate::{HaitaleError, HaitaleResult};

use super::CatalogProvider;

/// Catálogo em arquivo: um array JSON de [`CatalogEntry`].
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Caminho do arquivo.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogProvider for FileCatalog {
    fn name(&self) -> &str {
        "file"
    }

    async fn catalog(&self) -> HaitaleResult<Vec<CatalogEntry>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            HaitaleError::catalog(format!("{}: {}", self.path.display(), e))
        })?;

        let entries: Vec<CatalogEntry> = serde_json::from_str(&content)?;
        tracing::debug!(path = %self.path.display(), entries = entries.len(), "Loaded catalog file");

        Ok(entries)
    }
}
