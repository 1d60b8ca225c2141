use tracing::{instrument, warn};

use crate::error::GenerationError;
use crate::generation::{SuggestionsPayload, parse_payload};
use crate::llm::Llm;

/// Proposes contexts that would make a prompt easier to translate accurately.
pub struct ContextSuggester<L: Llm> {
    llm: L,
}

impl<L: Llm> ContextSuggester<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    /// The model is asked for three; whatever list of strings it returns is accepted.
    #[instrument(skip(self, prompt))]
    pub async fn suggest_contexts(&self, prompt: &str) -> Result<Vec<String>, GenerationError> {
        let raw = self
            .llm
            .run_task(SUGGESTION_GUIDELINES, format!("Prompt: {prompt}"))
            .await
            .map_err(|e| {
                warn!("Generation backend failed: {:#}", e);
                GenerationError::backend(format!("{e:#}"))
            })?;

        let payload: SuggestionsPayload = parse_payload(&raw)?;
        Ok(payload.suggestions)
    }
}

const SUGGESTION_GUIDELINES: &str = r#"You are an AI assistant designed to provide helpful context suggestions for improving translation quality.

Given the following prompt, suggest three different contexts that could be relevant for translating the prompt more accurately.

Respond with ONLY a JSON object of this exact shape:
{"suggestions": ["...", "...", "..."]}"#;
