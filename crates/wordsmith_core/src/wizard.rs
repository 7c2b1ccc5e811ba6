//! Project configuration wizard.
//!
//! Three phases, each gated by a remote check: the project name must be
//! free, the dataset must be readable, then the full configuration is saved.
//! Like the procedure controller this is a pure `update` over messages; the
//! engine performs the emitted effects and reports back.

use serde::{Deserialize, Serialize};
use wordsmith_logging::ws_debug;

use crate::{FieldError, Notification, SchemaColumn, SubmissionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardPhase {
    #[default]
    CheckProjectId,
    CheckDataset,
    Configure,
    Finished,
}

impl WizardPhase {
    /// 1-based step shown in the wizard title ("1/3").
    pub fn step(self) -> usize {
        match self {
            WizardPhase::CheckProjectId => 1,
            WizardPhase::CheckDataset => 2,
            WizardPhase::Configure | WizardPhase::Finished => 3,
        }
    }

    fn previous(self) -> Self {
        match self {
            WizardPhase::CheckProjectId | WizardPhase::CheckDataset => WizardPhase::CheckProjectId,
            WizardPhase::Configure => WizardPhase::CheckDataset,
            WizardPhase::Finished => WizardPhase::Finished,
        }
    }
}

/// Where the dataset lives and how to parse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource {
    Csv {
        path: String,
        delimiter: String,
        limit: Option<u32>,
    },
    Excel {
        path: String,
        #[serde(rename = "sheetName")]
        sheet_name: String,
    },
    Parquet {
        path: String,
    },
}

impl DataSource {
    pub fn csv(path: impl Into<String>) -> Self {
        DataSource::Csv {
            path: path.into(),
            delimiter: ",".to_string(),
            limit: None,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            DataSource::Csv { path, .. }
            | DataSource::Excel { path, .. }
            | DataSource::Parquet { path } => path,
        }
    }

    /// Local checks run before the dataset is sent for remote validation.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.path().trim().is_empty() {
            errors.push(FieldError::new("source.path", "required"));
        }
        match self {
            DataSource::Csv {
                delimiter, limit, ..
            } => {
                if delimiter.is_empty() {
                    errors.push(FieldError::new("source.delimiter", "required"));
                }
                if *limit == Some(0) {
                    errors.push(FieldError::new("source.limit", "must be at least 1"));
                }
            }
            DataSource::Excel { sheet_name, .. } => {
                if sheet_name.trim().is_empty() {
                    errors.push(FieldError::new("source.sheetName", "required"));
                }
            }
            DataSource::Parquet { .. } => {}
        }
        errors
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::csv("")
    }
}

/// Project being edited; its dataset is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingProject {
    pub project_id: String,
    pub source: DataSource,
    pub columns: Vec<SchemaColumn>,
}

/// Successful answer of a remote check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckResponse {
    pub message: Option<String>,
    /// Inferred dataset columns; empty for the project name check.
    pub columns: Vec<SchemaColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    #[serde(rename = "projectId")]
    pub project_id: String,
    pub source: DataSource,
    /// Column configuration from the final form, passed through untouched.
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedProject {
    pub project_id: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Update { project_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMsg {
    ProjectIdEdited(String),
    SourceEdited(DataSource),
    ContinueClicked,
    BackClicked,
    CheckCompleted {
        phase: WizardPhase,
        result: Result<CheckResponse, SubmissionError>,
    },
    SaveClicked(serde_json::Value),
    SaveCompleted(Result<SavedProject, SubmissionError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEffect {
    CheckProjectId { project_id: String },
    CheckDataset { source: DataSource },
    SaveProject { mode: SaveMode, input: ProjectInput },
    Notify(Notification),
    NavigateToProject { project_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardState {
    phase: WizardPhase,
    project_id: String,
    source: DataSource,
    editing: Option<String>,
    columns: Vec<SchemaColumn>,
    busy: bool,
    field_errors: Vec<FieldError>,
    dirty: bool,
}

impl WizardState {
    pub fn new(existing: Option<ExistingProject>) -> Self {
        match existing {
            Some(project) => Self {
                project_id: project.project_id.clone(),
                source: project.source,
                editing: Some(project.project_id),
                columns: project.columns,
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Dataset fields cannot change once a project exists.
    pub fn is_source_read_only(&self) -> bool {
        self.editing.is_some()
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn advance(&mut self) {
        self.phase = match self.phase {
            WizardPhase::CheckProjectId => WizardPhase::CheckDataset,
            WizardPhase::CheckDataset => WizardPhase::Configure,
            WizardPhase::Configure | WizardPhase::Finished => WizardPhase::Finished,
        };
        self.field_errors.clear();
    }

    fn reject(&mut self, err: SubmissionError, effects: &mut Vec<WizardEffect>) {
        if err.is_validation() {
            self.field_errors = err.field_errors;
        } else {
            effects.push(WizardEffect::Notify(Notification::error(err.message)));
        }
    }

    /// The remote names dataset fields relative to the source; the form keys
    /// them under `source.`. The message is shown even alongside field errors.
    fn reject_dataset(&mut self, err: SubmissionError, effects: &mut Vec<WizardEffect>) {
        effects.push(WizardEffect::Notify(Notification::error(err.message)));
        self.field_errors = err
            .field_errors
            .into_iter()
            .map(|e| FieldError {
                field: source_field(e.field),
                message: e.message,
            })
            .collect();
    }
}

fn source_field(field: String) -> String {
    if field.starts_with("source.") {
        field
    } else {
        format!("source.{field}")
    }
}

/// Pure update function for the configuration wizard.
pub fn update_wizard(mut state: WizardState, msg: WizardMsg) -> (WizardState, Vec<WizardEffect>) {
    let mut effects = Vec::new();
    if state.phase == WizardPhase::Finished {
        return (state, effects);
    }

    match msg {
        WizardMsg::ProjectIdEdited(project_id) => {
            if state.phase == WizardPhase::CheckProjectId && !state.busy {
                state.project_id = project_id;
                state.field_errors.retain(|e| e.field != "projectId");
                state.dirty = true;
            }
        }
        WizardMsg::SourceEdited(source) => {
            if state.phase == WizardPhase::CheckDataset
                && !state.busy
                && !state.is_source_read_only()
            {
                state.source = source;
                state.field_errors.retain(|e| !e.field.starts_with("source."));
                state.dirty = true;
            }
        }
        WizardMsg::ContinueClicked => {
            if state.busy {
                return (state, effects);
            }
            match state.phase {
                WizardPhase::CheckProjectId => {
                    let project_id = state.project_id.trim().to_string();
                    if project_id.is_empty() {
                        state.field_errors = vec![FieldError::new("projectId", "required")];
                    } else {
                        state.busy = true;
                        effects.push(WizardEffect::CheckProjectId { project_id });
                    }
                }
                WizardPhase::CheckDataset => {
                    if state.is_source_read_only() {
                        state.advance();
                    } else {
                        let errors = state.source.validate();
                        if errors.is_empty() {
                            state.busy = true;
                            effects.push(WizardEffect::CheckDataset {
                                source: state.source.clone(),
                            });
                        } else {
                            state.field_errors = errors;
                        }
                    }
                }
                WizardPhase::Configure | WizardPhase::Finished => {}
            }
            state.dirty = true;
        }
        WizardMsg::BackClicked => {
            if !state.busy && state.phase != WizardPhase::CheckProjectId {
                state.phase = state.phase.previous();
                state.field_errors.clear();
                state.dirty = true;
            }
        }
        WizardMsg::CheckCompleted { phase, result } => {
            if !state.busy || phase != state.phase {
                ws_debug!("ignoring check result for {phase:?} while in {:?}", state.phase);
                return (state, effects);
            }
            state.busy = false;
            match result {
                Ok(response) => {
                    if let Some(message) = response.message {
                        effects.push(WizardEffect::Notify(Notification::success(message)));
                    }
                    if phase == WizardPhase::CheckDataset {
                        state.columns = response.columns;
                    }
                    state.advance();
                }
                Err(err) if phase == WizardPhase::CheckDataset => {
                    state.reject_dataset(err, &mut effects)
                }
                Err(err) => state.reject(err, &mut effects),
            }
            state.dirty = true;
        }
        WizardMsg::SaveClicked(config) => {
            if state.phase == WizardPhase::Configure && !state.busy {
                let mode = match &state.editing {
                    Some(project_id) => SaveMode::Update {
                        project_id: project_id.clone(),
                    },
                    None => SaveMode::Create,
                };
                state.busy = true;
                state.dirty = true;
                effects.push(WizardEffect::SaveProject {
                    mode,
                    input: ProjectInput {
                        project_id: state.project_id.trim().to_string(),
                        source: state.source.clone(),
                        config,
                    },
                });
            }
        }
        WizardMsg::SaveCompleted(result) => {
            if state.phase != WizardPhase::Configure || !state.busy {
                return (state, effects);
            }
            state.busy = false;
            match result {
                Ok(saved) => {
                    if let Some(message) = saved.message {
                        effects.push(WizardEffect::Notify(Notification::success(message)));
                    }
                    if state.editing.is_none() {
                        effects.push(WizardEffect::NavigateToProject {
                            project_id: saved.project_id,
                        });
                    }
                    state.advance();
                }
                Err(err) => state.reject(err, &mut effects),
            }
            state.dirty = true;
        }
    }

    (state, effects)
}
