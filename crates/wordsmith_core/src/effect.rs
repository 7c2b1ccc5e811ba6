use std::time::Duration;

use crate::{ProcedurePayload, ProcedureRequest, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit {
        session: SessionId,
        request: ProcedureRequest,
    },
    Poll {
        session: SessionId,
        request: ProcedureRequest,
    },
    SchedulePoll {
        session: SessionId,
        tick: u64,
        after: Duration,
    },
    /// Drop every timer still pending for the session.
    StopPolling { session: SessionId },
    StoreResult {
        request: ProcedureRequest,
        payload: ProcedurePayload,
    },
    Notify(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// One-shot message for the user, outside of any form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}
