use serde::{Deserialize, Serialize};

/// A named context the user saved for reuse.
///
/// Names are not required to be unique; see `WorkflowController::delete_preset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedContext {
    pub name: String,
    pub value: String,
}

impl SavedContext {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let preset = SavedContext::new("Formal", "Business email tone");
        let json = serde_json::to_string(&preset).unwrap();
        assert_eq!(json, r#"{"name":"Formal","value":"Business email tone"}"#);
    }
}
