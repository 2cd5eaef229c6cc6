//! Fontes de catálogo de mods.
//!
//! O pipeline de recomendação só conhece o trait [`CatalogProvider`]. Clientes
//! de registros remotos ficam fora deste crate; aqui há uma fonte baseada em
//! arquivo e uma em memória.

mod file;

pub use file::FileCatalog;

use async_trait::async_trait;

use crate::types::CatalogEntry;
use crate::HaitaleResult;

/// Fonte de entradas do catálogo.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Nome da fonte, usado em logs.
    fn name(&self) -> &str;

    /// Todas as entradas conhecidas.
    async fn catalog(&self) -> HaitaleResult<Vec<CatalogEntry>>;

    /// Somente as entradas com licença livre.
    async fn free_catalog(&self) -> HaitaleResult<Vec<CatalogEntry>> {
        let entries = self.catalog().await?;
        let total = entries.len();
        let free: Vec<CatalogEntry> = entries.into_iter().filter(|e| e.is_free_license()).collect();

        tracing::debug!(
            provider = self.name(),
            total,
            free = free.len(),
            "Filtered catalog by license"
        );

        Ok(free)
    }
}

/// Catálogo fixo em memória.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    fn name(&self) -> &str {
        "static"
    }

    async fn catalog(&self) -> HaitaleResult<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }
}
