use anyhow::Result;
use std::future::Future;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, error, info};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::llm::{GenerationBackend, Llm};
use crate::translation::{TranslationRequest, TranslationResult, Translator};

/// A submission tagged with the sequence number the controller issued for it.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub seq: u64,
    pub request: TranslationRequest,
}

#[derive(Debug, Clone)]
pub struct TranslationResponse {
    pub seq: u64,
    pub outcome: Result<TranslationResult, GenerationError>,
}

pub type JobReceiver = mpsc::UnboundedReceiver<TranslationJob>;
pub type ResponseSender = mpsc::UnboundedSender<TranslationResponse>;

pub struct TranslationService {
    request_tx: mpsc::UnboundedSender<TranslationJob>,
    response_rx: mpsc::UnboundedReceiver<TranslationResponse>,
}

impl TranslationService {
    /// Spawn a worker that builds the configured backend and translates jobs in order.
    pub fn new(config: GenerationConfig) -> Self {
        Self::spawn_worker(|request_rx, response_tx| async move {
            // Built inside the task so a slow model download doesn't block the UI
            let translator = match GenerationBackend::from_config(&config).await {
                Ok(backend) => {
                    info!("Generation backend ready");
                    Ok(Translator::new(backend))
                }
                Err(e) => {
                    error!("Failed to initialize generation backend: {:#}", e);
                    Err(GenerationError::Unavailable(format!("{e:#}")))
                }
            };
            serve_jobs(translator, request_rx, response_tx).await;
        })
    }

    /// Spawn a worker that fails every job with [`GenerationError::Disabled`].
    pub fn disabled() -> Self {
        Self::spawn_worker(|request_rx, response_tx| {
            serve_jobs::<GenerationBackend>(Err(GenerationError::Disabled), request_rx, response_tx)
        })
    }

    /// Wire up the channels and spawn `start` as the worker task.
    pub fn spawn_worker<F, Fut>(start: F) -> Self
    where
        F: FnOnce(JobReceiver, ResponseSender) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::unbounded_channel::<TranslationJob>();
        let (response_tx, response_rx) = mpsc::unbounded_channel::<TranslationResponse>();

        tokio::spawn(start(request_rx, response_tx));

        Self {
            request_tx,
            response_rx,
        }
    }

    pub fn request_translation(&self, job: TranslationJob) -> Result<()> {
        self.request_tx
            .send(job)
            .map_err(|e| anyhow::anyhow!("Failed to send translation request: {}", e))?;

        Ok(())
    }

    /// Next finished translation, if any. Fails once the worker is gone and
    /// nothing is left to receive.
    pub fn try_recv_translation(&mut self) -> Result<Option<TranslationResponse>, GenerationError> {
        match self.response_rx.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(GenerationError::Unavailable(
                "translation worker stopped".to_string(),
            )),
        }
    }
}

/// Answer jobs in arrival order until the service is dropped.
pub async fn serve_jobs<L: Llm>(
    translator: Result<Translator<L>, GenerationError>,
    mut request_rx: JobReceiver,
    response_tx: ResponseSender,
) {
    debug!("Translation worker started");

    while let Some(job) = request_rx.recv().await {
        debug!("Processing translation job {}", job.seq);

        let outcome = match &translator {
            Ok(translator) => translator.translate(&job.request).await,
            Err(e) => Err(e.clone()),
        };

        if let Err(e) = response_tx.send(TranslationResponse {
            seq: job.seq,
            outcome,
        }) {
            error!("Failed to send translation response: {}", e);
        }
    }

    debug!("Translation worker stopped");
}
