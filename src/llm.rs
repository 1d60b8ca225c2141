use anyhow::Result;
use kalosm::language::{ChatModelExt, Llama, ModelBuilder};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::config::{BackendKind, GenerationConfig};
use crate::remote::RemoteModel;

static LLAMA: OnceCell<Llama> = OnceCell::const_new();

/// Llm completes tasks by generating text.
pub trait Llm {
    async fn run_task(
        &self,
        task_description: impl ToString,
        task_input_text: impl ToString,
    ) -> Result<String>;
}

impl Llm for Llama {
    /// Generate text using guidelines and input text.
    async fn run_task(&self, guidelines: impl ToString, input: impl ToString) -> Result<String> {
        self.task(guidelines)
            .run(input)
            .await
            .map_err(anyhow::Error::from)
    }
}

/// The generation service selected in the config.
#[derive(Clone)]
pub enum GenerationBackend {
    Local(Llama),
    Remote(RemoteModel),
}

impl GenerationBackend {
    /// Build the configured backend. The local model is downloaded on first use.
    #[instrument(skip(config), fields(backend = ?config.backend))]
    pub async fn from_config(config: &GenerationConfig) -> Result<Self> {
        match config.backend {
            BackendKind::Local => {
                let llm = get_llm().await?;
                Ok(Self::Local(llm.clone()))
            }
            BackendKind::Remote => Ok(Self::Remote(RemoteModel::from_config(config)?)),
        }
    }
}

impl Llm for GenerationBackend {
    async fn run_task(&self, guidelines: impl ToString, input: impl ToString) -> Result<String> {
        match self {
            Self::Local(llama) => llama.run_task(guidelines, input).await,
            Self::Remote(remote) => remote.run_task(guidelines, input).await,
        }
    }
}

/// Ensure that all AI models are present.
#[instrument]
pub async fn ensure_ai_models_present() -> Result<()> {
    if Llama::builder().requires_download() {
        debug!("Downloading Llama weights");
        let _ = get_llm().await?;
    }
    debug!("All models are downloaded");

    Ok(())
}

/// Warm AI models so they respond quickly.
#[instrument]
pub async fn warm_ai_models() -> Result<()> {
    let llm = get_llm().await?;

    debug!("Warming Llama instance");
    llm.task("Say hello back.").run("Hello!").await?;
    debug!("Warmed Llama instance");

    Ok(())
}

/// Get the lazily initialized Llama instance.
pub async fn get_llm() -> Result<&'static Llama> {
    LLAMA
        .get_or_try_init(|| async { Llama::new_chat().await })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize model: {}", e))
}
