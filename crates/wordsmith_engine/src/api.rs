use wordsmith_core::wizard::{CheckResponse, DataSource, ProjectInput, SavedProject};
use wordsmith_core::{
    Accepted, PollError, ProcedureRequest, RemoteStatus, SubmissionError,
};

/// Remote job execution: start a procedure, then ask how it is doing.
#[async_trait::async_trait]
pub trait ProcedureApi: Send + Sync {
    /// Side-effecting. Duplicate submissions are the caller's problem.
    async fn submit(&self, request: &ProcedureRequest) -> Result<Accepted, SubmissionError>;

    /// Side-effect free; safe to call repeatedly.
    async fn poll(&self, request: &ProcedureRequest) -> Result<RemoteStatus, PollError>;
}

/// Remote validation and persistence used by the configuration wizard.
#[async_trait::async_trait]
pub trait ProjectApi: Send + Sync {
    async fn check_project_id(&self, project_id: &str) -> Result<CheckResponse, SubmissionError>;

    async fn check_dataset(&self, source: &DataSource) -> Result<CheckResponse, SubmissionError>;

    async fn create_project(&self, input: &ProjectInput) -> Result<SavedProject, SubmissionError>;

    async fn update_project(
        &self,
        project_id: &str,
        input: &ProjectInput,
    ) -> Result<SavedProject, SubmissionError>;
}
