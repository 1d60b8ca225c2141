//! Boundary between raw model text and typed results.
//!
//! Models are asked to answer with a single JSON object, but local models in
//! particular tend to wrap it in prose or a code fence. We take the outermost
//! `{ ... }` span and deserialize it strictly: unknown or missing fields are a
//! [`GenerationError::Malformed`].

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::GenerationError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslationsPayload {
    pub translations: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestionsPayload {
    pub suggestions: Vec<String>,
}

/// Slice from the first `{` to the last `}`.
fn json_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

pub fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, GenerationError> {
    let span = json_object_span(raw)
        .ok_or_else(|| GenerationError::Malformed("no JSON object in model output".to_string()))?;

    serde_json::from_str(span).map_err(|e| GenerationError::Malformed(e.to_string()))
}
