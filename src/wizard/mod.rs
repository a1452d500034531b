//! Agent wizard: the four-step flow for creating or editing an agent.
//!
//! `state` holds the step machine and reducer, `form` the typed fields,
//! `controller` the async upload/save effects, and `preview` / `review` the
//! pure views derived from the form.

pub mod controller;
pub mod form;
pub mod preview;
pub mod review;
pub mod state;

pub use controller::{SubmitOutcome, UploadOutcome, WizardController};
pub use form::{AgentForm, AgentPayload, FormPatch, MediaType, VoiceType};
pub use preview::ChatPreview;
pub use review::ReviewSummary;
pub use state::{WizardAction, WizardMode, WizardState, WizardStep};
