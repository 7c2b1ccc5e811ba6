use crate::view_model::ProcedureViewModel;
use crate::{
    FieldError, ProcedureError, ProcedureOptions, ProcedurePayload, ProcedureRequest,
    ProcedureStatus,
};

pub type SessionId = u64;

/// Lifecycle position of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Succeeded,
    Failed,
}

impl Phase {
    /// Remote work is outstanding for the session.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Submitting | Phase::Polling)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// State of one procedure controller. Mutated only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureState {
    options: ProcedureOptions,
    request: ProcedureRequest,
    mounted: bool,
    session: SessionId,
    phase: Phase,
    status: ProcedureStatus,
    /// Autostart already fired for this key.
    autostart_consumed: bool,
    /// The remote accepted the current session's submission.
    accepted: bool,
    poll_in_flight: bool,
    /// Sequence number of the only timer tick that may still issue a poll.
    tick: u64,
    poll_count: u32,
    poll_failures: u32,
    data: Option<ProcedurePayload>,
    data_request: Option<ProcedureRequest>,
    field_errors: Vec<FieldError>,
    dirty: bool,
}

impl Default for ProcedureState {
    fn default() -> Self {
        Self::new(ProcedureRequest::default(), ProcedureOptions::default())
    }
}

impl ProcedureState {
    pub fn new(request: ProcedureRequest, options: ProcedureOptions) -> Self {
        Self {
            options,
            request,
            mounted: false,
            session: 0,
            phase: Phase::Idle,
            status: ProcedureStatus::NotStarted,
            autostart_consumed: false,
            accepted: false,
            poll_in_flight: false,
            tick: 0,
            poll_count: 0,
            poll_failures: 0,
            data: None,
            data_request: None,
            field_errors: Vec::new(),
            dirty: false,
        }
    }

    pub fn view(&self) -> ProcedureViewModel {
        ProcedureViewModel {
            request: self.request.clone(),
            session: self.session,
            phase: self.phase,
            status: self.status.clone(),
            is_pending: self.phase.is_active(),
            poll_in_flight: self.poll_in_flight,
            poll_count: self.poll_count,
            poll_failures: self.poll_failures,
            data: self.data.clone(),
            data_request: self.data_request.clone(),
            field_errors: self.field_errors.clone(),
            enabled: self.options.enabled,
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn request(&self) -> &ProcedureRequest {
        &self.request
    }

    pub fn options(&self) -> &ProcedureOptions {
        &self.options
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> &ProcedureStatus {
        &self.status
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_mounted(&mut self, mounted: bool) {
        if self.mounted != mounted {
            self.mounted = mounted;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
        self.mark_dirty();
    }

    pub(crate) fn is_current(&self, session: SessionId) -> bool {
        self.session == session
    }

    /// Whether a new session may be opened for the current key right now.
    pub(crate) fn can_begin(&self) -> bool {
        self.options.enabled && self.request.is_actionable() && !self.phase.is_active()
    }

    pub(crate) fn wants_autostart(&self) -> bool {
        self.mounted
            && self.options.autostart
            && !self.autostart_consumed
            && self.phase == Phase::Idle
            && self.can_begin()
    }

    pub(crate) fn can_refetch(&self) -> bool {
        self.options.enabled
            && self.accepted
            && !self.poll_in_flight
            && matches!(self.phase, Phase::Polling | Phase::Succeeded | Phase::Failed)
    }

    pub(crate) fn poll_in_flight(&self) -> bool {
        self.poll_in_flight
    }

    pub(crate) fn expects_tick(&self, tick: u64) -> bool {
        self.tick == tick
    }

    /// Opens a fresh session for the current key. Completions addressed to
    /// the previous session id are ignored from here on.
    pub(crate) fn begin_session(&mut self) -> SessionId {
        self.reset_session();
        self.autostart_consumed = true;
        self.session
    }

    /// Replaces the request key. Previously displayed data survives only when
    /// `keep_previous_data` is set.
    pub(crate) fn switch_request(&mut self, request: ProcedureRequest) {
        self.request = request;
        self.reset_session();
        self.autostart_consumed = false;
        if !self.options.keep_previous_data {
            self.clear_data();
        }
    }

    /// Drops the current session without a result.
    pub(crate) fn abandon(&mut self) {
        self.reset_session();
        self.autostart_consumed = false;
    }

    /// Forgets everything tied to the consuming view.
    pub(crate) fn teardown(&mut self) {
        self.abandon();
        self.clear_data();
        self.mounted = false;
    }

    pub(crate) fn mark_submitting(&mut self) {
        self.phase = Phase::Submitting;
        self.status = ProcedureStatus::Running;
        self.mark_dirty();
    }

    pub(crate) fn mark_accepted(&mut self) {
        self.accepted = true;
        self.mark_polling();
    }

    pub(crate) fn mark_polling(&mut self) {
        self.phase = Phase::Polling;
        self.status = ProcedureStatus::Running;
        self.mark_dirty();
    }

    /// Marks a poll as outstanding and invalidates any pending tick.
    pub(crate) fn start_poll(&mut self) {
        self.poll_in_flight = true;
        self.poll_count += 1;
        self.tick += 1;
        self.mark_dirty();
    }

    pub(crate) fn finish_poll(&mut self) {
        self.poll_in_flight = false;
        self.mark_dirty();
    }

    pub(crate) fn record_poll_failure(&mut self) -> u32 {
        self.poll_failures += 1;
        self.poll_failures
    }

    /// Reserves the tick a newly scheduled timer will carry.
    pub(crate) fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub(crate) fn succeed(&mut self, payload: ProcedurePayload) {
        self.phase = Phase::Succeeded;
        self.status = ProcedureStatus::Succeeded(payload.clone());
        self.data = Some(payload);
        self.data_request = Some(self.request.clone());
        self.field_errors.clear();
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, error: ProcedureError) {
        if let ProcedureError::Submission(err) = &error {
            self.field_errors = err.field_errors.clone();
        }
        self.phase = Phase::Failed;
        self.status = ProcedureStatus::Failed(error);
        self.clear_data();
        self.mark_dirty();
    }

    fn reset_session(&mut self) {
        self.session += 1;
        self.phase = Phase::Idle;
        self.status = ProcedureStatus::NotStarted;
        self.accepted = false;
        self.poll_in_flight = false;
        self.tick = 0;
        self.poll_count = 0;
        self.poll_failures = 0;
        self.field_errors.clear();
        self.mark_dirty();
    }

    fn clear_data(&mut self) {
        self.data = None;
        self.data_request = None;
    }
}
