//! Pré-filtro de candidatos.
//!
//! Reduz o catálogo antes da chamada ao modelo, usando o [`RelevanceScorer`].

use crate::types::config::PrefilterConfig;
use crate::types::CatalogEntry;

use super::relevance::RelevanceScorer;

/// Catálogos com até este tamanho não são filtrados.
pub const SMALL_CATALOG_SIZE: usize = 20;

/// Abaixo disso o filtro é considerado agressivo demais.
pub const MIN_FILTERED_CANDIDATES: usize = 5;

/// Quantidade de entradas devolvidas pelo escape hatch.
pub const ESCAPE_HATCH_SIZE: usize = 20;

/// Pré-filtro baseado em relevância.
#[derive(Debug, Clone)]
pub struct PreFilter {
    scorer: RelevanceScorer,
    threshold: f64,
    max_candidates: usize,
}

impl PreFilter {
    /// Cria um pré-filtro.
    pub fn new(threshold: f64, max_candidates: usize) -> Self {
        Self {
            scorer: RelevanceScorer::new(),
            threshold,
            max_candidates,
        }
    }

    /// Cria a partir da configuração.
    pub fn from_config(config: &PrefilterConfig) -> Self {
        Self::new(config.threshold, config.max_candidates)
    }

    /// Filtra o catálogo para a descrição.
    ///
    /// Nunca retorna vazio, a menos que o catálogo esteja vazio.
    pub fn filter(&self, catalog: &[CatalogEntry], description: &str) -> Vec<CatalogEntry> {
        if catalog.len() <= SMALL_CATALOG_SIZE {
            return catalog.to_vec();
        }

        let mut scored: Vec<(f64, &CatalogEntry)> = catalog
            .iter()
            .map(|entry| (self.scorer.score(entry, description), entry))
            .filter(|(score, _)| *score > self.threshold)
            .collect();

        // sort_by é estável: empates mantêm a ordem do catálogo
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(self.max_candidates);

        if scored.len() < MIN_FILTERED_CANDIDATES {
            tracing::warn!(
                kept = scored.len(),
                fallback = ESCAPE_HATCH_SIZE,
                "Pre-filtering too aggressive, using leading catalog entries instead"
            );
            return catalog.iter().take(ESCAPE_HATCH_SIZE).cloned().collect();
        }

        scored.into_iter().map(|(_, entry)| entry.clone()).collect()
    }
}

impl Default for PreFilter {
    fn default() -> Self {
        Self::from_config(&PrefilterConfig::default())
    }
}
