//! Parser da saída do modelo.
//!
//! A saída é texto não confiável: pode vir com prosa em volta do JSON, ids
//! inventados, scores fora do intervalo ou duplicatas.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CatalogEntry, Recommendation};

/// Falha ao interpretar a saída do modelo.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("model output is not a valid recommendation array: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model output is empty")]
    Empty,
}

/// Item cru da resposta do modelo.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecommendation {
    #[serde(default)]
    pub mod_id: Option<String>,

    #[serde(default)]
    pub relevance_score: Option<f64>,

    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Converte texto do modelo em recomendações resolvidas contra os candidatos.
pub struct ResponseParser;

impl ResponseParser {
    /// Extrai o trecho entre o primeiro `[` e o último `]`.
    ///
    /// Sem esse par, devolve o texto inteiro.
    pub fn extract_json_array(text: &str) -> &str {
        match (text.find('['), text.rfind(']')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => text,
        }
    }

    /// Interpreta a resposta.
    ///
    /// Itens sem id ou com id desconhecido são descartados e a ordem do modelo
    /// é mantida.
    pub fn parse(raw: &str, candidates: &[CatalogEntry]) -> Result<Vec<Recommendation>, ParseError> {
        if raw.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let items: Vec<AiRecommendation> = serde_json::from_str(Self::extract_json_array(raw))?;

        let mut seen = HashSet::new();
        let mut recommendations = Vec::with_capacity(items.len());

        for item in items {
            let Some(mod_id) = item.mod_id else {
                tracing::debug!("Dropping model output item without a mod id");
                continue;
            };

            let Some(entry) = candidates.iter().find(|c| c.id == mod_id) else {
                tracing::debug!(mod_id = %mod_id, "Dropping unknown mod id from model output");
                continue;
            };

            if !seen.insert(mod_id) {
                continue;
            }

            let score = item.relevance_score.filter(|s| !s.is_nan()).unwrap_or(0.0);

            recommendations.push(Recommendation::new(
                entry.clone(),
                item.reasoning.unwrap_or_default(),
                score,
            ));
        }

        Ok(recommendations)
    }
}
