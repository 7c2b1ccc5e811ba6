//! Wordsmith core: pure procedure state machine, result cache and wizard flow.
mod cache;
mod effect;
mod msg;
mod options;
mod request;
mod schema;
mod state;
mod status;
mod update;
mod view_model;
pub mod wizard;

pub use cache::{
    is_advised_to_run, CachedResult, Clock, InMemoryResultCache, ResultCache, StalenessPolicy,
};
pub use effect::{Effect, Notification, NotificationLevel};
pub use msg::Msg;
pub use options::{ProcedureOptions, DEFAULT_POLL_INTERVAL_MS};
pub use request::{ProcedureKind, ProcedureRequest};
pub use schema::{
    first_textual_column, non_unique_columns, textual_columns, SchemaColumn, SchemaColumnType,
};
pub use state::{Phase, ProcedureState, SessionId};
pub use status::{
    Accepted, FieldError, PollError, ProcedureError, ProcedurePayload, ProcedureStatus,
    RemoteFailure, RemoteStatus, SubmissionError,
};
pub use update::update;
pub use view_model::ProcedureViewModel;
