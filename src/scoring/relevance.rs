//! Score de relevância por palavras-chave.
//!
//! Função pura: compara a descrição do mundo com nome e descrição de um mod,
//! somando pontos por token e bônus por categoria. O resultado é sempre
//! limitado a `[0.0, 1.0]`.

use crate::types::CatalogEntry;

/// Tokens menores que isso são ignorados.
const MIN_TOKEN_CHARS: usize = 3;

/// Pontos por token encontrado no nome do mod.
const NAME_TOKEN_BONUS: f64 = 0.2;

/// Pontos por token encontrado na descrição do mod.
const DESCRIPTION_TOKEN_BONUS: f64 = 0.1;

/// Justificativa usada quando nenhuma regra de reasoning casa.
pub const DEFAULT_REASONING: &str = "Matches your world description keywords.";

/// Tipo de regra de categoria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Categoria funcional (construção, aventura, tecnologia, magia).
    Functional,
    /// Tema (medieval, fantasia, sci-fi).
    Theme,
}

/// Regra de categoria aplicada sobre descrição e mod.
///
/// Dispara quando a descrição contém algum `triggers` e o nome do mod contém
/// algum `name_matches` ou a descrição do mod contém algum
/// `description_matches`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub name: &'static str,
    pub kind: RuleKind,
    pub triggers: &'static [&'static str],
    pub name_matches: &'static [&'static str],
    pub description_matches: &'static [&'static str],
    pub bonus: f64,
}

/// Tabela de categorias.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "building",
        kind: RuleKind::Functional,
        triggers: &["build", "construct", "creat"],
        name_matches: &["build"],
        description_matches: &["build", "construction"],
        bonus: 0.3,
    },
    CategoryRule {
        name: "adventure",
        kind: RuleKind::Functional,
        triggers: &["adventure", "quest", "explore"],
        name_matches: &["adventure", "quest"],
        description_matches: &["adventure", "quest", "dungeon"],
        bonus: 0.3,
    },
    CategoryRule {
        name: "technology",
        kind: RuleKind::Functional,
        triggers: &["tech", "machine", "automat"],
        name_matches: &["tech", "machine"],
        description_matches: &["tech", "machine", "automation"],
        bonus: 0.3,
    },
    CategoryRule {
        name: "magic",
        kind: RuleKind::Functional,
        triggers: &["magic", "spell", "wizard"],
        name_matches: &["magic", "spell", "mystic"],
        description_matches: &["magic", "spell", "enchant"],
        bonus: 0.3,
    },
    CategoryRule {
        name: "medieval",
        kind: RuleKind::Theme,
        triggers: &["medieval", "castle", "knight"],
        name_matches: &["medieval"],
        description_matches: &["medieval", "castle"],
        bonus: 0.2,
    },
    CategoryRule {
        name: "fantasy",
        kind: RuleKind::Theme,
        triggers: &["fantasy", "dragon", "mythical"],
        name_matches: &["fantasy"],
        description_matches: &["fantasy", "dragon"],
        bonus: 0.2,
    },
    CategoryRule {
        name: "sci-fi",
        kind: RuleKind::Theme,
        triggers: &["sci-fi", "futuristic", "space"],
        name_matches: &["tech"],
        description_matches: &["futuristic", "space"],
        bonus: 0.2,
    },
];

/// Regra de justificativa do fallback.
///
/// Só olha a descrição do mod, nunca o nome.
#[derive(Debug, Clone, Copy)]
pub struct ReasoningRule {
    pub triggers: &'static [&'static str],
    pub description_matches: &'static [&'static str],
    pub sentence: &'static str,
}

/// Tabela de justificativas, na ordem em que aparecem no texto.
pub const REASONING_RULES: &[ReasoningRule] = &[
    ReasoningRule {
        triggers: &["build", "construct"],
        description_matches: &["build"],
        sentence: "Enhances building capabilities.",
    },
    ReasoningRule {
        triggers: &["adventure", "quest"],
        description_matches: &["adventure", "quest"],
        sentence: "Adds adventure and quest content.",
    },
    ReasoningRule {
        triggers: &["tech", "machine"],
        description_matches: &["tech", "machine"],
        sentence: "Introduces technological elements.",
    },
    ReasoningRule {
        triggers: &["magic", "spell"],
        description_matches: &["magic", "spell"],
        sentence: "Brings magical gameplay.",
    },
];

/// Textos já normalizados para comparação.
struct Normalized {
    query: String,
    name: String,
    description: String,
}

impl Normalized {
    fn new(entry: &CatalogEntry, description: &str) -> Self {
        Self {
            query: description.to_lowercase(),
            name: entry.name.to_lowercase(),
            description: entry.description.to_lowercase(),
        }
    }
}

/// Regras de categoria que disparam para o texto.
fn matched_rules(text: &Normalized) -> impl Iterator<Item = &'static CategoryRule> + '_ {
    CATEGORY_RULES.iter().filter(move |rule| rule.fires(text))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

impl CategoryRule {
    fn fires(&self, text: &Normalized) -> bool {
        contains_any(&text.query, self.triggers)
            && (contains_any(&text.name, self.name_matches)
                || contains_any(&text.description, self.description_matches))
    }
}

/// Scorer de relevância.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceScorer;

impl RelevanceScorer {
    /// Cria um novo scorer.
    pub fn new() -> Self {
        Self
    }

    /// Calcula a relevância de um mod para a descrição (0.0 - 1.0).
    pub fn score(&self, entry: &CatalogEntry, description: &str) -> f64 {
        let text = Normalized::new(entry, description);
        let mut score = 0.0;

        for token in text.query.split_whitespace() {
            if token.chars().count() < MIN_TOKEN_CHARS {
                continue;
            }
            if text.name.contains(token) {
                score += NAME_TOKEN_BONUS;
            }
            if text.description.contains(token) {
                score += DESCRIPTION_TOKEN_BONUS;
            }
        }

        score += matched_rules(&text).map(|rule| rule.bonus).sum::<f64>();

        score.clamp(0.0, 1.0)
    }

    /// Gera a justificativa templada do fallback.
    pub fn reasoning(&self, entry: &CatalogEntry, description: &str) -> String {
        let query = description.to_lowercase();
        let entry_description = entry.description.to_lowercase();

        let sentences: Vec<&str> = REASONING_RULES
            .iter()
            .filter(|rule| {
                contains_any(&query, rule.triggers)
                    && contains_any(&entry_description, rule.description_matches)
            })
            .map(|rule| rule.sentence)
            .collect();

        if sentences.is_empty() {
            DEFAULT_REASONING.to_string()
        } else {
            sentences.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, description: &str) -> CatalogEntry {
        CatalogEntry::new("id", name, description)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_no_match_scores_zero() {
        let scorer = RelevanceScorer::new();
        let e = entry("Fishing Plus", "More fish in rivers");

        assert_eq!(scorer.score(&e, "a quiet desert"), 0.0);
    }

    #[test]
    fn test_short_tokens_ignored() {
        let scorer = RelevanceScorer::new();
        let e = entry("Ox", "an ox of war");

        // "ox" e "of" têm menos de 3 caracteres
        assert_eq!(scorer.score(&e, "ox of"), 0.0);
    }

    #[test]
    fn test_token_bonus_name_and_description() {
        let scorer = RelevanceScorer::new();
        let e = entry("Farming Tools", "Better farming for everyone");

        // "farming" no nome (0.2) e na descrição (0.1)
        assert!(approx(scorer.score(&e, "farming"), 0.3));
    }

    #[test]
    fn test_category_bonus_via_description() {
        let scorer = RelevanceScorer::new();
        let e = entry("Realms", "Ancient dungeon crawling");

        // Só a regra de aventura: "explore" -> "dungeon"
        assert!(approx(scorer.score(&e, "explore"), 0.3));
    }

    #[test]
    fn test_theme_bonus() {
        let scorer = RelevanceScorer::new();
        let e = entry("Stoneworks", "Walls for a castle");

        // "castle" na descrição (0.1) + tema medieval (0.2)
        assert!(approx(scorer.score(&e, "castle"), 0.3));
    }

    #[test]
    fn test_scifi_matches_tech_in_name() {
        let e = entry("TechCraft", "Gadgets");

        let text = Normalized::new(&e, "futuristic");
        let names: Vec<&str> = matched_rules(&text).map(|r| r.name).collect();
        assert_eq!(names, vec!["sci-fi"]);
    }

    #[test]
    fn test_score_clamped_to_one() {
        let scorer = RelevanceScorer::new();
        let e = entry(
            "Magic Spell Building Adventure",
            "magic spell building construction adventure quest dungeon castle dragon",
        );

        let score = scorer.score(
            &e,
            "magic spell building adventure quest castle dragon fantasy medieval",
        );
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_score_always_in_range() {
        let scorer = RelevanceScorer::new();
        let entries = [
            entry("", ""),
            entry("Build Build Build", "build build"),
            entry("Ñandú Møde", "ünïcödé"),
        ];
        let queries = ["", "   ", "build build build build build build", "ünïcödé ñandú"];

        for e in &entries {
            for q in &queries {
                let s = scorer.score(e, q);
                assert!((0.0..=1.0).contains(&s), "score {s} out of range");
            }
        }
    }

    #[test]
    fn test_case_insensitive() {
        let scorer = RelevanceScorer::new();
        let e = entry("MAGIC Realms", "SPELLS");

        assert!(scorer.score(&e, "Magic") > 0.0);
    }

    #[test]
    fn test_reasoning_magic() {
        let scorer = RelevanceScorer::new();
        let e = entry("Arcana", "Adds magic spells");

        assert_eq!(scorer.reasoning(&e, "I want magic"), "Brings magical gameplay.");
    }

    #[test]
    fn test_reasoning_joins_sentences() {
        let scorer = RelevanceScorer::new();
        let e = entry("Kit", "build machines");

        assert_eq!(
            scorer.reasoning(&e, "build tech"),
            "Enhances building capabilities. Introduces technological elements."
        );
    }

    #[test]
    fn test_reasoning_default() {
        let scorer = RelevanceScorer::new();
        let e = entry("Farming Tools", "Better farming");

        assert_eq!(scorer.reasoning(&e, "farming"), DEFAULT_REASONING);
    }

    #[test]
    fn test_rule_table_bonuses() {
        for rule in CATEGORY_RULES {
            let expected = match rule.kind {
                RuleKind::Functional => 0.3,
                RuleKind::Theme => 0.2,
            };
            assert!(approx(rule.bonus, expected), "rule {}", rule.name);
        }
    }
}
