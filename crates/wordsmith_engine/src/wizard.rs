use std::sync::Arc;

use wordsmith_core::wizard::{
    update_wizard, ProjectInput, SavedProject, SaveMode, WizardEffect, WizardMsg, WizardPhase,
    WizardState,
};
use wordsmith_core::{Notification, SubmissionError};
use wordsmith_logging::ws_info;

use crate::api::ProjectApi;

/// Host-side follow-ups of a wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    Notify(Notification),
    NavigateToProject { project_id: String },
}

/// Runs the configuration wizard against a [`ProjectApi`]. The wizard has at
/// most one remote check in flight, so remote effects are awaited inline.
pub struct WizardRunner {
    api: Arc<dyn ProjectApi>,
    state: WizardState,
}

impl WizardRunner {
    pub fn new(api: Arc<dyn ProjectApi>, state: WizardState) -> Self {
        Self { api, state }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Applies a user message, performs any remote calls it triggers and
    /// returns the actions left for the host.
    pub async fn send(&mut self, msg: WizardMsg) -> Vec<WizardAction> {
        let mut actions = Vec::new();
        let mut inbox = vec![msg];
        while let Some(msg) = inbox.pop() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update_wizard(state, msg);
            self.state = state;
            for effect in effects {
                match effect {
                    WizardEffect::Notify(notification) => {
                        actions.push(WizardAction::Notify(notification));
                    }
                    WizardEffect::NavigateToProject { project_id } => {
                        actions.push(WizardAction::NavigateToProject { project_id });
                    }
                    WizardEffect::CheckProjectId { project_id } => {
                        ws_info!("checking project id {project_id}");
                        inbox.push(WizardMsg::CheckCompleted {
                            phase: WizardPhase::CheckProjectId,
                            result: self.api.check_project_id(&project_id).await,
                        });
                    }
                    WizardEffect::CheckDataset { source } => {
                        ws_info!("checking dataset {}", source.path());
                        inbox.push(WizardMsg::CheckCompleted {
                            phase: WizardPhase::CheckDataset,
                            result: self.api.check_dataset(&source).await,
                        });
                    }
                    WizardEffect::SaveProject { mode, input } => {
                        inbox.push(WizardMsg::SaveCompleted(self.save(mode, &input).await));
                    }
                }
            }
        }
        actions
    }

    async fn save(
        &self,
        mode: SaveMode,
        input: &ProjectInput,
    ) -> Result<SavedProject, SubmissionError> {
        match mode {
            SaveMode::Create => {
                ws_info!("creating project {}", input.project_id);
                self.api.create_project(input).await
            }
            SaveMode::Update { project_id } => {
                ws_info!("updating project {project_id}");
                self.api.update_project(&project_id, input).await
            }
        }
    }
}
