use thiserror::Error;

/// A required field was empty. Shown inline next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,
    #[error("Context name cannot be empty.")]
    EmptyPresetName,
    #[error("Context field is empty. Nothing to save.")]
    EmptyContext,
}

/// The generation service failed or answered with something we can't use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation backend failed: {0}")]
    Backend(String),
    #[error("model output does not match the expected schema: {0}")]
    Malformed(String),
    #[error("expected {expected} translations, model returned {actual}")]
    WrongCount { expected: usize, actual: usize },
    #[error("generation is disabled in the configuration")]
    Disabled,
    #[error("generation backend is unavailable: {0}")]
    Unavailable(String),
}

impl GenerationError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Local persistence was unreadable or could not be written.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read saved contexts from {key}: {reason}")]
    Read { key: String, reason: String },
    #[error("could not write saved contexts to {key}: {reason}")]
    Write { key: String, reason: String },
}

/// Why a submission did not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("a translation request is already in flight")]
    Busy,
}
