//! Pipeline de recomendação: prompt, parser e orquestração.

mod orchestrator;
mod parser;
mod prompt;

pub use orchestrator::{AiOutcome, RecommendationOrchestrator, FALLBACK_THRESHOLD};
pub use parser::{AiRecommendation, ParseError, ResponseParser};
pub use prompt::PromptBuilder;
