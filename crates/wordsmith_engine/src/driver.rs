//! Async executor for the procedure state machine.
//!
//! The driver is the single writer of [`ProcedureState`]. Remote calls and
//! timers run as spawned tokio tasks whose only output is one report sent
//! back over a channel; [`ProcedureDriver::next`] feeds those reports into
//! the pure `update` function. Results of abandoned sessions still arrive and
//! are discarded by the core.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use wordsmith_core::{
    update, Effect, Msg, Notification, ProcedureOptions, ProcedureRequest, ProcedureState,
    ProcedureViewModel, ResultCache, SessionId,
};
use wordsmith_logging::{ws_debug, ws_info, ws_trace};

use crate::api::ProcedureApi;

/// What observers are told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    StateChanged(ProcedureViewModel),
    Notification(Notification),
}

pub type ObserverId = u64;

type Observer = Box<dyn FnMut(&DriverEvent) + Send>;

enum TaskReport {
    Completed(Msg),
    TimerCancelled,
}

pub struct ProcedureDriver {
    api: Arc<dyn ProcedureApi>,
    cache: Arc<dyn ResultCache>,
    state: ProcedureState,
    report_tx: UnboundedSender<TaskReport>,
    report_rx: UnboundedReceiver<TaskReport>,
    /// Spawned tasks that have not reported yet.
    outstanding: usize,
    timers: HashMap<SessionId, CancellationToken>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: ObserverId,
}

impl ProcedureDriver {
    pub fn new(
        api: Arc<dyn ProcedureApi>,
        cache: Arc<dyn ResultCache>,
        request: ProcedureRequest,
        options: ProcedureOptions,
    ) -> Self {
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        Self {
            api,
            cache,
            state: ProcedureState::new(request, options),
            report_tx,
            report_rx,
            outstanding: 0,
            timers: HashMap::new(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn view(&self) -> ProcedureViewModel {
        self.state.view()
    }

    pub fn cache(&self) -> &Arc<dyn ResultCache> {
        &self.cache
    }

    /// Number of spawned calls and timers that still owe a report.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&DriverEvent) + Send + 'static) -> ObserverId {
        self.next_observer += 1;
        self.observers.push((self.next_observer, Box::new(observer)));
        self.next_observer
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn start(&mut self) {
        self.dispatch(Msg::Start);
    }

    pub fn execute(&mut self) {
        self.dispatch(Msg::Execute);
    }

    pub fn refetch(&mut self) {
        self.dispatch(Msg::Refetch);
    }

    pub fn set_request(&mut self, request: ProcedureRequest) {
        self.dispatch(Msg::RequestChanged(request));
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.dispatch(Msg::EnabledChanged(enabled));
    }

    pub fn cancel(&mut self) {
        self.dispatch(Msg::Cancel);
    }

    /// Applies a message and runs the resulting effects.
    ///
    /// Must be called from within a tokio runtime; effects spawn tasks.
    pub fn dispatch(&mut self, msg: Msg) {
        ws_trace!("dispatch {msg:?}");
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg, self.cache.as_ref());
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;

        for effect in effects {
            self.run_effect(effect);
        }
        if let Some(view) = view {
            self.emit(&DriverEvent::StateChanged(view));
        }
    }

    /// Waits for the next task report and applies it. Returns `false` when
    /// nothing is outstanding.
    pub async fn next(&mut self) -> bool {
        if self.outstanding == 0 {
            return false;
        }
        let Some(report) = self.report_rx.recv().await else {
            return false;
        };
        self.outstanding -= 1;
        match report {
            TaskReport::Completed(msg) => self.dispatch(msg),
            TaskReport::TimerCancelled => {}
        }
        true
    }

    /// Processes reports until no call or timer is outstanding, i.e. the
    /// session is terminal, idle or abandoned with all stragglers drained.
    pub async fn run_until_idle(&mut self) {
        while self.next().await {}
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Submit { session, request } => {
                ws_info!("session {session}: submit {request}");
                let api = self.api.clone();
                self.spawn(async move {
                    let result = api.submit(&request).await;
                    TaskReport::Completed(Msg::SubmitCompleted { session, result })
                });
            }
            Effect::Poll { session, request } => {
                ws_debug!("session {session}: poll {request}");
                let api = self.api.clone();
                self.spawn(async move {
                    let result = api.poll(&request).await;
                    TaskReport::Completed(Msg::PollCompleted { session, result })
                });
            }
            Effect::SchedulePoll {
                session,
                tick,
                after,
            } => {
                let token = self.timers.entry(session).or_default().clone();
                self.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => TaskReport::TimerCancelled,
                        _ = tokio::time::sleep(after) => {
                            TaskReport::Completed(Msg::PollDue { session, tick })
                        }
                    }
                });
            }
            Effect::StopPolling { session } => {
                if let Some(token) = self.timers.remove(&session) {
                    token.cancel();
                }
            }
            Effect::StoreResult { request, payload } => {
                self.cache.store(request, payload);
            }
            Effect::Notify(notification) => {
                self.emit(&DriverEvent::Notification(notification));
            }
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = TaskReport> + Send + 'static,
    {
        self.outstanding += 1;
        let report_tx = self.report_tx.clone();
        tokio::spawn(async move {
            // The driver may be gone by now; nobody is left to tell.
            let _ = report_tx.send(task.await);
        });
    }

    fn emit(&mut self, event: &DriverEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(event);
        }
    }
}

impl Drop for ProcedureDriver {
    fn drop(&mut self) {
        for token in self.timers.values() {
            token.cancel();
        }
    }
}
