use crate::{Accepted, PollError, ProcedureRequest, RemoteStatus, SessionId, SubmissionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The consuming view mounted; autostart may kick in.
    Start,
    /// User asked to run the procedure.
    Execute,
    /// Out-of-band poll, outside the schedule.
    Refetch,
    /// The request key changed (new column selection, other project).
    RequestChanged(ProcedureRequest),
    /// The enabled gate flipped.
    EnabledChanged(bool),
    /// Poll timer fired.
    PollDue { session: SessionId, tick: u64 },
    /// Remote answered a submission.
    SubmitCompleted {
        session: SessionId,
        result: Result<Accepted, SubmissionError>,
    },
    /// Remote answered a poll.
    PollCompleted {
        session: SessionId,
        result: Result<RemoteStatus, PollError>,
    },
    /// The consuming view was torn down.
    Cancel,
    NoOp,
}
