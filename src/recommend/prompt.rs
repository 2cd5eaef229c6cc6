//! Construção dos prompts enviados ao modelo.

use crate::client::CompletionPrompt;
use crate::types::config::PromptConfig;
use crate::types::CatalogEntry;

/// Monta os prompts de sistema e de usuário.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    description_max_length: usize,
}

impl PromptBuilder {
    /// Cria um builder que corta descrições em `description_max_length` caracteres.
    pub fn new(description_max_length: usize) -> Self {
        Self {
            description_max_length,
        }
    }

    /// Cria a partir da configuração.
    pub fn from_config(config: &PromptConfig) -> Self {
        Self::new(config.description_max_length)
    }

    /// Prompt completo para os candidatos.
    pub fn build(&self, candidates: &[CatalogEntry], description: &str) -> CompletionPrompt {
        CompletionPrompt {
            system: self.system_prompt(candidates),
            user: Self::user_prompt(description),
            description: description.to_string(),
            candidate_ids: candidates.iter().map(|c| c.id.clone()).collect(),
        }
    }

    /// Linha de um candidato: `id: nome - descrição`.
    pub fn candidate_line(&self, entry: &CatalogEntry) -> String {
        format!(
            "{}: {} - {}",
            entry.id,
            entry.name,
            truncate(&entry.description, self.description_max_length)
        )
    }

    /// Prompt de sistema com a lista de candidatos e o formato de resposta.
    pub fn system_prompt(&self, candidates: &[CatalogEntry]) -> String {
        let mut prompt = String::from(
            "You are a helpful assistant that recommends HyTale mods based on user preferences. ",
        );
        prompt.push_str(
            "Given a description of the world a user wants to create, \
             recommend the most suitable mods from the available list.\n\n",
        );
        prompt.push_str("Available mods:\n");

        for entry in candidates {
            prompt.push_str("- ");
            prompt.push_str(&self.candidate_line(entry));
            prompt.push('\n');
        }

        prompt.push_str("\nRespond in this exact JSON format:\n");
        prompt.push_str("[\n");
        prompt.push_str("  {\n");
        prompt.push_str("    \"modId\": \"mod-id-here\",\n");
        prompt.push_str("    \"relevanceScore\": 0.95,\n");
        prompt.push_str("    \"reasoning\": \"Brief explanation of why this mod fits\"\n");
        prompt.push_str("  }\n");
        prompt.push_str("]\n\n");
        prompt.push_str("Only recommend mods that actually match the user's description. ");
        prompt.push_str("Score should be between 0.0 and 1.0 based on relevance. ");
        prompt.push_str("Return at most 5 recommendations, sorted by relevance.");

        prompt
    }

    /// Prompt do usuário.
    pub fn user_prompt(description: &str) -> String {
        format!("I want to create: {}", description)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from_config(&PromptConfig::default())
    }
}

/// Corta em `max_chars` caracteres (não bytes) e acrescenta `...` quando corta.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
