use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};

use crate::llm::Llm;

/// Canned generation service that records every task input it receives.
#[derive(Clone)]
pub struct StubLlm {
    reply: Result<String, String>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl StubLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            inputs: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            inputs: Arc::default(),
        }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Llm for StubLlm {
    async fn run_task(&self, _guidelines: impl ToString, input: impl ToString) -> Result<String> {
        self.inputs.lock().unwrap().push(input.to_string());
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}
