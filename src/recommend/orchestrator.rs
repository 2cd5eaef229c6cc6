//! Orquestrador de recomendações.
//!
//! Pré-filtro, prompt, cliente e parser formam o caminho de IA. Qualquer
//! falha nesse caminho cai no fallback por regras sobre o catálogo inteiro.

use std::sync::Arc;

use tracing::Instrument;

use crate::catalog::CatalogProvider;
use crate::client::{ResilientAiClient, SharedState};
use crate::scoring::{PreFilter, RelevanceScorer};
use crate::types::config::Config;
use crate::types::{CatalogEntry, Recommendation};
use crate::HaitaleResult;

use super::parser::ResponseParser;
use super::prompt::PromptBuilder;

/// Score mínimo (exclusivo) de uma recomendação por regras.
pub const FALLBACK_THRESHOLD: f64 = 0.3;

/// Resultado do caminho de IA.
#[derive(Debug, Clone, PartialEq)]
pub enum AiOutcome {
    /// Recomendações resolvidas (nunca vazio).
    Recommendations(Vec<Recommendation>),

    /// O caminho de IA não produziu nada útil.
    NeedsFallback(String),
}

/// Ponto de entrada do pipeline de recomendação.
pub struct RecommendationOrchestrator {
    prefilter: PreFilter,
    prefilter_enabled: bool,
    prompts: PromptBuilder,
    client: ResilientAiClient,
    scorer: RelevanceScorer,
}

impl RecommendationOrchestrator {
    /// Cria o orquestrador com um cliente já montado.
    pub fn new(config: &Config, client: ResilientAiClient) -> Self {
        Self {
            prefilter: PreFilter::from_config(&config.prefilter),
            prefilter_enabled: config.prefilter.enabled,
            prompts: PromptBuilder::from_config(&config.prompt),
            client,
            scorer: RelevanceScorer::new(),
        }
    }

    /// Cria o orquestrador com cliente HTTP e estado novo.
    pub fn from_config(config: &Config) -> HaitaleResult<Self> {
        let state = Arc::new(SharedState::from_config(config));
        let client = ResilientAiClient::from_config(config, state)?;
        Ok(Self::new(config, client))
    }

    /// Cliente usado no caminho de IA.
    pub fn client(&self) -> &ResilientAiClient {
        &self.client
    }

    /// Recomenda mods do catálogo para a descrição. Nunca falha.
    pub async fn recommend(&self, catalog: &[CatalogEntry], description: &str) -> Vec<Recommendation> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("recommend", request_id = %request_id);

        async {
            tracing::info!(catalog = catalog.len(), "Generating recommendations");

            match self.ai_recommendations(catalog, description).await {
                AiOutcome::Recommendations(recs) => {
                    tracing::info!(count = recs.len(), "Using AI recommendations");
                    recs
                }
                AiOutcome::NeedsFallback(reason) => {
                    tracing::info!(reason = %reason, "Falling back to rule-based recommendations");
                    self.rule_based(catalog, description)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Busca o catálogo livre do provider e recomenda.
    ///
    /// Falha do provider vira lista vazia.
    pub async fn recommend_from(
        &self,
        provider: &dyn CatalogProvider,
        description: &str,
    ) -> Vec<Recommendation> {
        match provider.free_catalog().await {
            Ok(catalog) => self.recommend(&catalog, description).await,
            Err(e) => {
                tracing::error!(provider = provider.name(), error = %e, "Unable to load catalog");
                Vec::new()
            }
        }
    }

    /// Caminho de IA: pré-filtro, prompt, chamada e parse.
    pub async fn ai_recommendations(&self, catalog: &[CatalogEntry], description: &str) -> AiOutcome {
        let candidates = if self.prefilter_enabled {
            let filtered = self.prefilter.filter(catalog, description);
            tracing::info!(
                catalog = catalog.len(),
                candidates = filtered.len(),
                "Pre-filtered catalog"
            );
            filtered
        } else {
            catalog.to_vec()
        };

        if candidates.is_empty() {
            return AiOutcome::NeedsFallback("no candidates".to_string());
        }

        let prompt = self.prompts.build(&candidates, description);

        let raw = match self.client.try_complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => return AiOutcome::NeedsFallback(e.to_string()),
        };

        match ResponseParser::parse(&raw, &candidates) {
            Ok(recs) if !recs.is_empty() => AiOutcome::Recommendations(recs),
            Ok(_) => AiOutcome::NeedsFallback("model returned no known mods".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Unable to parse model output");
                AiOutcome::NeedsFallback(e.to_string())
            }
        }
    }

    /// Recomendações por regras sobre o catálogo inteiro.
    pub fn rule_based(&self, catalog: &[CatalogEntry], description: &str) -> Vec<Recommendation> {
        let mut recs: Vec<Recommendation> = catalog
            .iter()
            .filter_map(|entry| {
                let score = self.scorer.score(entry, description);
                (score > FALLBACK_THRESHOLD).then(|| {
                    Recommendation::new(entry.clone(), self.scorer.reasoning(entry, description), score)
                })
            })
            .collect();

        recs.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        recs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator(config: &Config) -> RecommendationOrchestrator {
        RecommendationOrchestrator::from_config(config).unwrap()
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("farming", "Better Farming", "More crops"),
            CatalogEntry::new("spells", "Magic Spells", "Cast powerful spells"),
            CatalogEntry::new("castles", "Castle Walls", "Medieval castle building blocks"),
        ]
    }

    #[test]
    fn test_rule_based_sorted_and_thresholded() {
        let orch = orchestrator(&Config::default());

        let recs = orch.rule_based(&catalog(), "a medieval castle with magic");

        assert!(!recs.is_empty());
        assert!(recs.iter().all(|r| r.relevance_score > FALLBACK_THRESHOLD));
        assert!(recs
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
        assert!(recs.iter().all(|r| r.entry.id != "farming"));
    }

    #[test]
    fn test_rule_based_no_match() {
        let orch = orchestrator(&Config::default());

        assert!(orch.rule_based(&catalog(), "ocean").is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_needs_fallback() {
        let orch = orchestrator(&Config::default());

        let outcome = orch.ai_recommendations(&catalog(), "magic").await;
        assert!(matches!(outcome, AiOutcome::NeedsFallback(_)));
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let orch = orchestrator(&Config::default());

        assert!(orch.recommend(&[], "magic").await.is_empty());
        assert_eq!(
            orch.ai_recommendations(&[], "magic").await,
            AiOutcome::NeedsFallback("no candidates".to_string())
        );
    }
}
