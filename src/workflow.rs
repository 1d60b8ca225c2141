//! Workflow controller: form state, the submission lifecycle, and preset
//! bookkeeping.
//!
//! The controller never awaits anything itself except in [`WorkflowController::translate_now`].
//! Interactive callers split a submission into [`WorkflowController::submit`], which
//! hands back a sequence-tagged job, and [`WorkflowController::complete`], which applies
//! the matching response. Responses tagged with anything but the latest issued
//! sequence number are dropped.

use tracing::{debug, info, warn};

use crate::entities::SavedContext;
use crate::error::{GenerationError, StorageError, SubmitError, ValidationError};
use crate::llm::Llm;
use crate::preset_store::PresetStore;
use crate::translation::{TranslationRequest, Translator};
use crate::translation_service::{TranslationJob, TranslationResponse};

/// Older notifications are dropped once this many are queued.
pub const MAX_NOTIFICATIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A dismissible, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

pub struct WorkflowController<S: PresetStore> {
    /// Text to translate, as typed
    pub prompt: String,
    /// Translation context, as typed
    pub context: String,
    store: S,
    presets: Vec<SavedContext>,
    phase: Phase,
    translations: Vec<String>,
    next_seq: u64,
    in_flight: Option<u64>,
    prompt_error: Option<ValidationError>,
    last_error: Option<GenerationError>,
    notifications: Vec<Notification>,
}

impl<S: PresetStore> WorkflowController<S> {
    /// Load saved contexts from `store`. An unreadable store leaves the list
    /// empty and queues an error notification.
    pub fn new(store: S) -> Self {
        let mut controller = Self {
            prompt: String::new(),
            context: String::new(),
            store,
            presets: Vec::new(),
            phase: Phase::Idle,
            translations: Vec::new(),
            next_seq: 0,
            in_flight: None,
            prompt_error: None,
            last_error: None,
            notifications: Vec::new(),
        };

        match controller.store.load() {
            Ok(presets) => controller.presets = presets,
            Err(e) => {
                warn!("Failed to load contexts: {}", e);
                controller.notify(Notification::error("Error", "Could not load saved contexts."));
            }
        }

        controller
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Sequence number of the submission awaiting a response.
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Results of the last successful submission; empty otherwise.
    pub fn translations(&self) -> &[String] {
        &self.translations
    }

    pub fn presets(&self) -> &[SavedContext] {
        &self.presets
    }

    pub fn prompt_error(&self) -> Option<&ValidationError> {
        self.prompt_error.as_ref()
    }

    /// Why the latest submission failed, if it did.
    pub fn last_error(&self) -> Option<&GenerationError> {
        self.last_error.as_ref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Newest notification, the one on screen.
    pub fn current_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    pub fn notify(&mut self, notification: Notification) {
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
        self.notifications.push(notification);
    }

    /// Drop the newest notification, uncovering the one before it.
    pub fn dismiss_notification(&mut self) -> Option<Notification> {
        self.notifications.pop()
    }

    /// Validate the form and enter `Submitting`.
    ///
    /// On success the previous results are cleared and the returned job must be
    /// answered through [`Self::complete`]. A validation failure is also recorded
    /// as the prompt's field error and leaves the phase untouched.
    pub fn submit(&mut self) -> Result<TranslationJob, SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::Busy);
        }
        if self.prompt.is_empty() {
            self.prompt_error = Some(ValidationError::EmptyPrompt);
            return Err(ValidationError::EmptyPrompt.into());
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        self.prompt_error = None;
        self.last_error = None;
        self.translations.clear();
        self.in_flight = Some(seq);
        self.phase = Phase::Submitting;

        debug!("Submitting translation {}", seq);
        Ok(TranslationJob {
            seq,
            request: TranslationRequest::new(self.prompt.clone(), self.context.clone()),
        })
    }

    /// Apply a response. Returns `false` if it was stale and discarded.
    pub fn complete(&mut self, response: TranslationResponse) -> bool {
        if self.in_flight != Some(response.seq) {
            debug!(
                "Discarding stale translation {} (in flight: {:?})",
                response.seq, self.in_flight
            );
            return false;
        }
        self.in_flight = None;

        match response.outcome {
            Ok(result) => {
                info!("Translation {} succeeded", response.seq);
                self.translations = result.into_vec();
                self.phase = Phase::Succeeded;
            }
            Err(e) => {
                self.fail(response.seq, &e);
            }
        }
        true
    }

    fn fail(&mut self, seq: u64, error: &GenerationError) {
        warn!("Translation {} failed: {}", seq, error);
        self.phase = Phase::Failed;
        self.last_error = Some(error.clone());
        self.notify(Notification::error(
            "Translation Error",
            "An error occurred while generating translations. Please try again.",
        ));
    }

    /// Submit and wait for the translator in one go.
    pub async fn translate_now<L: Llm>(
        &mut self,
        translator: &Translator<L>,
    ) -> Result<Phase, SubmitError> {
        let job = self.submit()?;
        let outcome = translator.translate(&job.request).await;
        self.complete(TranslationResponse {
            seq: job.seq,
            outcome,
        });
        Ok(self.phase)
    }

    /// Save the current context field under `name`.
    ///
    /// Duplicate names are allowed. Returns whether the list was persisted; if
    /// persisting fails the in-memory list is left as it was.
    pub fn save_preset(&mut self, name: &str) -> Result<bool, ValidationError> {
        if name.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyPresetName));
        }
        if self.context.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyContext));
        }

        let mut updated = self.presets.clone();
        updated.push(SavedContext::new(name, self.context.clone()));

        match self.persist(updated) {
            Ok(()) => {
                self.notify(Notification::info(
                    "Success",
                    format!("Context \"{name}\" saved."),
                ));
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to save context: {}", e);
                self.notify(Notification::error("Error", "Could not save context."));
                Ok(false)
            }
        }
    }

    /// Remove every preset named exactly `name`. Unknown names are a no-op.
    /// Returns whether the list was persisted.
    pub fn delete_preset(&mut self, name: &str) -> bool {
        let updated: Vec<SavedContext> = self
            .presets
            .iter()
            .filter(|preset| preset.name != name)
            .cloned()
            .collect();

        match self.persist(updated) {
            Ok(()) => {
                self.notify(Notification::info(
                    "Context Deleted",
                    format!("Context \"{name}\" has been removed."),
                ));
                true
            }
            Err(e) => {
                warn!("Failed to delete context: {}", e);
                self.notify(Notification::error("Error", "Could not delete context."));
                false
            }
        }
    }

    /// Copy the first preset named `name` into the context field.
    pub fn select_preset(&mut self, name: &str) -> bool {
        match self.presets.iter().find(|preset| preset.name == name) {
            Some(preset) => {
                self.context = preset.value.clone();
                true
            }
            None => false,
        }
    }

    fn persist(&mut self, updated: Vec<SavedContext>) -> Result<(), StorageError> {
        self.store.save_all(&updated)?;
        self.presets = updated;
        Ok(())
    }

    fn reject(&mut self, error: ValidationError) -> ValidationError {
        self.notify(Notification::error("Error", error.to_string()));
        error
    }
}
