use tracing::{debug, instrument, warn};

use crate::error::GenerationError;
use crate::generation::{TranslationsPayload, parse_payload};
use crate::llm::Llm;

/// How many alternatives every successful translation carries.
pub const TRANSLATION_COUNT: usize = 4;

/// Context sent when the user left the field empty.
pub const DEFAULT_CONTEXT: &str = "general";

/// One submission's worth of input, with the context default already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub prompt: String,
    pub context: String,
}

impl TranslationRequest {
    pub fn new(prompt: impl Into<String>, context: impl Into<String>) -> Self {
        let context = context.into();
        let context = if context.is_empty() {
            DEFAULT_CONTEXT.to_string()
        } else {
            context
        };

        Self {
            prompt: prompt.into(),
            context,
        }
    }
}

/// Exactly four alternative translations, in the order the model gave them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult([String; TRANSLATION_COUNT]);

impl TranslationResult {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0.into()
    }
}

impl TryFrom<Vec<String>> for TranslationResult {
    type Error = GenerationError;

    fn try_from(translations: Vec<String>) -> Result<Self, Self::Error> {
        let actual = translations.len();
        <[String; TRANSLATION_COUNT]>::try_from(translations)
            .map(Self)
            .map_err(|_| GenerationError::WrongCount {
                expected: TRANSLATION_COUNT,
                actual,
            })
    }
}

/// A Translator asks the model for four translations of a prompt.
pub struct Translator<L: Llm> {
    llm: L,
}

impl<L: Llm> Translator<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    /// One model call; no retry.
    #[instrument(skip(self, request), fields(prompt_len = request.prompt.len()))]
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, GenerationError> {
        let raw = self
            .llm
            .run_task(Self::translation_guidelines(), Self::task_input(request))
            .await
            .map_err(|e| {
                warn!("Generation backend failed: {:#}", e);
                GenerationError::backend(format!("{e:#}"))
            })?;
        debug!("Model answered with {} bytes", raw.len());

        let payload: TranslationsPayload = parse_payload(&raw)?;
        TranslationResult::try_from(payload.translations)
    }

    fn translation_guidelines() -> String {
        format!(
            r#"You are a translation expert. You will generate {count} unique translations of the given prompt, considering the provided context.

Respond with ONLY a JSON object of this exact shape, with exactly {count} strings:
{{"translations": ["...", "...", "...", "..."]}}"#,
            count = TRANSLATION_COUNT
        )
    }

    fn task_input(request: &TranslationRequest) -> String {
        format!(
            "Prompt: {prompt}\nContext: {context}",
            prompt = request.prompt,
            context = request.context
        )
    }
}
