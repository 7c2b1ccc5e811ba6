use crate::{
    FieldError, Phase, ProcedurePayload, ProcedureRequest, ProcedureStatus, SessionId,
};

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureViewModel {
    pub request: ProcedureRequest,
    pub session: SessionId,
    pub phase: Phase,
    pub status: ProcedureStatus,
    /// Submission or polling is still outstanding.
    pub is_pending: bool,
    pub poll_in_flight: bool,
    pub poll_count: u32,
    pub poll_failures: u32,
    /// Result currently shown; may belong to a previous key.
    pub data: Option<ProcedurePayload>,
    /// Request that produced `data`.
    pub data_request: Option<ProcedureRequest>,
    pub field_errors: Vec<FieldError>,
    pub enabled: bool,
    pub dirty: bool,
}

impl ProcedureViewModel {
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// True when the shown data was produced by a different request than the
    /// current one.
    pub fn shows_previous_data(&self) -> bool {
        self.data_request
            .as_ref()
            .is_some_and(|request| *request != self.request)
    }
}
