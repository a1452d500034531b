//! WizardController: owns the wizard state and mediates the two network
//! operations the flow triggers (file upload, agent save).
//!
//! State mutations happen under a short lock that is never held across an
//! await. Results of in-flight operations are dropped once the controller is
//! unmounted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{AgentApi, Agent};
use crate::error::WizardError;
use crate::uploads::UploadReport;

use super::state::{WizardAction, WizardMode, WizardState, WizardStep};

/// Shown when the backend gives no usable reason for a failed save.
pub const GENERIC_SUBMIT_ERROR: &str = "Failed to create agent. Please try again.";

/// Result of `upload_staged_files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Another operation was already in flight; nothing was sent.
    Skipped,
    /// The controller was unmounted before the results arrived.
    Discarded,
    Completed(UploadReport),
}

/// Result of `submit_agent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Not on the review step, or another operation was in flight.
    Skipped,
    /// The controller was unmounted before the response arrived.
    Discarded,
    /// The agent was saved; the caller should drop the wizard.
    Saved { agent_id: Option<String> },
    /// Validation or the request failed; `error` holds the message.
    Failed { message: String },
}

pub struct WizardController {
    state: Mutex<WizardState>,
    api: Arc<dyn AgentApi>,
    mounted: AtomicBool,
}

impl WizardController {
    /// Controller for creating a new agent.
    pub fn new(api: Arc<dyn AgentApi>) -> Self {
        Self::with_state(api, WizardState::new())
    }

    /// Controller pre-populated with an existing agent.
    pub fn for_agent(api: Arc<dyn AgentApi>, agent: Agent) -> Self {
        Self::with_state(api, WizardState::for_edit(agent.id, agent.form, agent.files))
    }

    pub fn with_state(api: Arc<dyn AgentApi>, state: WizardState) -> Self {
        Self {
            state: Mutex::new(state),
            api,
            mounted: AtomicBool::new(true),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> WizardState {
        self.lock().clone()
    }

    pub fn current_step(&self) -> WizardStep {
        self.lock().current_step
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Stop applying results of operations still in flight.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
        tracing::debug!("Wizard unmounted");
    }

    /// Process one user action synchronously.
    pub fn dispatch(&self, action: WizardAction) -> Result<WizardStep, WizardError> {
        let mut state = self.lock();
        state.reduce(action)?;
        Ok(state.current_step)
    }

    /// Upload every staged file.
    ///
    /// Round-trips may overlap, but results are applied in the order the
    /// files were staged.
    pub async fn upload_staged_files(&self) -> UploadOutcome {
        let batch = {
            let mut state = self.lock();
            if state.is_loading {
                tracing::debug!("Upload requested while busy, ignoring");
                return UploadOutcome::Skipped;
            }
            if state.selected_files().is_empty() {
                return UploadOutcome::Completed(UploadReport::default());
            }
            state.is_loading = true;
            state.error = None;
            state.selected_files().to_vec()
        };

        tracing::info!(files = batch.len(), "Uploading staged files");
        let results =
            futures::future::join_all(batch.iter().map(|file| self.api.upload_file(file))).await;

        if !self.is_mounted() {
            tracing::debug!("Discarding upload results for unmounted wizard");
            return UploadOutcome::Discarded;
        }

        let mut state = self.lock();
        state.is_loading = false;
        let report = state.files.confirm(batch.into_iter().zip(results).collect());
        state.error = report.failure_summary();
        tracing::info!(
            uploaded = report.uploaded,
            failed = report.failed.len(),
            "Upload batch applied"
        );
        UploadOutcome::Completed(report)
    }

    /// Save the agent from the review step.
    pub async fn submit_agent(&self) -> SubmitOutcome {
        let (payload, mode) = {
            let mut state = self.lock();
            if state.is_loading || state.current_step != WizardStep::Review {
                tracing::debug!(step = %state.current_step, loading = state.is_loading, "Submit ignored");
                return SubmitOutcome::Skipped;
            }
            match state.form.to_payload(state.uploaded_files()) {
                Ok(payload) => {
                    state.is_loading = true;
                    state.error = None;
                    (payload, state.mode.clone())
                }
                Err(e) => {
                    let message = e.to_string();
                    state.error = Some(message.clone());
                    return SubmitOutcome::Failed { message };
                }
            }
        };

        let result = match &mode {
            WizardMode::Create => self.api.create_agent(&payload).await,
            WizardMode::Edit { agent_id } => self.api.update_agent(agent_id, &payload).await,
        };

        if !self.is_mounted() {
            tracing::debug!("Discarding submit result for unmounted wizard");
            return SubmitOutcome::Discarded;
        }

        let mut state = self.lock();
        state.is_loading = false;
        match result {
            Ok(agent_id) => {
                tracing::info!(agent_id = ?agent_id, "Agent saved");
                SubmitOutcome::Saved { agent_id }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Agent save failed");
                let message = e
                    .user_message()
                    .unwrap_or(GENERIC_SUBMIT_ERROR)
                    .to_string();
                state.error = Some(message.clone());
                SubmitOutcome::Failed { message }
            }
        }
    }
}
