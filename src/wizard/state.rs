//! Wizard state machine: the four steps and the reducer that drives them.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;
use crate::uploads::{StagedFile, UploadStagingQueue, UploadedFile};

use super::form::{AgentForm, FormPatch};

/// The steps of the agent wizard.
///
/// Progresses linearly: BasicInfo → Knowledge → Customize → Review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    BasicInfo,
    Knowledge,
    Customize,
    Review,
}

impl WizardStep {
    /// 1-based step number as shown in the progress bar.
    pub fn number(&self) -> u8 {
        match self {
            Self::BasicInfo => 1,
            Self::Knowledge => 2,
            Self::Customize => 3,
            Self::Review => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::BasicInfo),
            2 => Some(Self::Knowledge),
            3 => Some(Self::Customize),
            4 => Some(Self::Review),
            _ => None,
        }
    }

    /// Following step, capped at Review.
    pub fn next(&self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::Review)
    }

    /// Preceding step, floored at BasicInfo.
    pub fn previous(&self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::BasicInfo)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Info",
            Self::Knowledge => "Knowledge",
            Self::Customize => "Customize",
            Self::Review => "Review",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BasicInfo => "basic_info",
            Self::Knowledge => "knowledge",
            Self::Customize => "customize",
            Self::Review => "review",
        };
        write!(f, "{s}")
    }
}

/// Whether the wizard creates a new agent or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit { agent_id: String },
}

/// A user-triggered event, processed synchronously against the state.
#[derive(Debug, Clone)]
pub enum WizardAction {
    Advance,
    Retreat,
    UpdateForm(FormPatch),
    StageFiles(Vec<StagedFile>),
    UnstageFile(usize),
    ClearError,
}

/// The aggregate driving the wizard.
#[derive(Debug, Clone)]
pub struct WizardState {
    pub current_step: WizardStep,
    pub form: AgentForm,
    pub files: UploadStagingQueue,
    pub error: Option<String>,
    pub is_loading: bool,
    pub mode: WizardMode,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    /// Fresh state for creating an agent.
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::BasicInfo,
            form: AgentForm::default(),
            files: UploadStagingQueue::new(),
            error: None,
            is_loading: false,
            mode: WizardMode::Create,
        }
    }

    /// State pre-populated from an existing agent.
    pub fn for_edit(agent_id: impl Into<String>, form: AgentForm, files: Vec<UploadedFile>) -> Self {
        Self {
            form,
            files: UploadStagingQueue::with_uploaded(files),
            mode: WizardMode::Edit {
                agent_id: agent_id.into(),
            },
            ..Self::new()
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, WizardMode::Edit { .. })
    }

    pub fn selected_files(&self) -> &[StagedFile] {
        self.files.selected()
    }

    pub fn uploaded_files(&self) -> &[UploadedFile] {
        self.files.uploaded()
    }

    /// Advisory gate for the current step's "continue" control.
    pub fn can_advance(&self) -> bool {
        match self.current_step {
            WizardStep::BasicInfo => self.form.has_valid_name(),
            WizardStep::Knowledge => self.is_editing() || !self.files.uploaded().is_empty(),
            WizardStep::Customize => true,
            WizardStep::Review => false,
        }
    }

    /// Move forward if the current step allows it. A blocked advance changes nothing.
    pub fn advance(&mut self) -> WizardStep {
        if self.can_advance() {
            self.current_step = self.current_step.next();
            self.error = None;
        }
        self.current_step
    }

    pub fn retreat(&mut self) -> WizardStep {
        self.current_step = self.current_step.previous();
        self.error = None;
        self.current_step
    }

    pub fn update_form_data(&mut self, patch: FormPatch) {
        self.form.apply(patch);
    }

    pub fn stage_files(&mut self, files: Vec<StagedFile>) -> usize {
        self.files.stage(files)
    }

    pub fn unstage_file(&mut self, index: usize) -> Result<StagedFile, WizardError> {
        self.files.unstage(index)
    }

    /// Apply one action. Only `UnstageFile` can fail.
    pub fn reduce(&mut self, action: WizardAction) -> Result<(), WizardError> {
        match action {
            WizardAction::Advance => {
                let from = self.current_step;
                let to = self.advance();
                if from == to && from != WizardStep::Review {
                    tracing::debug!(step = from.title(), "Advance blocked by step precondition");
                }
            }
            WizardAction::Retreat => {
                self.retreat();
            }
            WizardAction::UpdateForm(patch) => self.update_form_data(patch),
            WizardAction::StageFiles(files) => {
                self.stage_files(files);
            }
            WizardAction::UnstageFile(index) => {
                self.unstage_file(index)?;
            }
            WizardAction::ClearError => self.error = None,
        }
        Ok(())
    }
}
