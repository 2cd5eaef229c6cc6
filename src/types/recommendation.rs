//! Recomendações produzidas pelo pipeline.

use serde::{Deserialize, Serialize};

use super::catalog::CatalogEntry;

/// Um mod recomendado com justificativa e score de relevância (0.0 - 1.0).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    /// Mod recomendado.
    pub entry: CatalogEntry,

    /// Justificativa.
    pub reasoning: String,

    /// Score de relevância.
    pub relevance_score: f64,
}

impl Recommendation {
    /// Cria uma recomendação. O score é limitado a `[0.0, 1.0]`.
    pub fn new(entry: CatalogEntry, reasoning: impl Into<String>, relevance_score: f64) -> Self {
        Self {
            entry,
            reasoning: reasoning.into(),
            relevance_score: relevance_score.clamp(0.0, 1.0),
        }
    }

    /// Score em porcentagem inteira.
    pub fn percent(&self) -> u8 {
        (self.relevance_score * 100.0).round() as u8
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}%] {}\n  Reason: {}",
            self.percent(),
            self.entry.name,
            self.reasoning
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_clamped() {
        let entry = CatalogEntry::new("a", "A", "");

        assert_eq!(Recommendation::new(entry.clone(), "r", 1.7).relevance_score, 1.0);
        assert_eq!(Recommendation::new(entry, "r", -0.2).relevance_score, 0.0);
    }

    #[test]
    fn test_display() {
        let rec = Recommendation::new(CatalogEntry::new("a", "Alpha", ""), "Fits well", 0.85);

        assert_eq!(rec.to_string(), "[85%] Alpha\n  Reason: Fits well");
    }
}
