//! Score de relevância e pré-filtro de candidatos.
//!
//! - [`RelevanceScorer`]: função pura de relevância (0.0 - 1.0)
//! - [`PreFilter`]: reduz catálogos grandes antes da chamada ao modelo

mod prefilter;
mod relevance;

pub use prefilter::{PreFilter, ESCAPE_HATCH_SIZE, MIN_FILTERED_CANDIDATES, SMALL_CATALOG_SIZE};
pub use relevance::{
    CategoryRule, ReasoningRule, RelevanceScorer, RuleKind, CATEGORY_RULES, DEFAULT_REASONING,
    REASONING_RULES,
};
