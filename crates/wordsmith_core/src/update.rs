use wordsmith_logging::{ws_debug, ws_warn};

use crate::{
    Effect, Msg, Notification, Phase, PollError, ProcedureError, ProcedureState, RemoteStatus,
    ResultCache, SessionId,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// The cache is only read here; writes go out as [`Effect::StoreResult`].
pub fn update(
    mut state: ProcedureState,
    msg: Msg,
    cache: &dyn ResultCache,
) -> (ProcedureState, Vec<Effect>) {
    let mut effects = Vec::new();
    match msg {
        Msg::Start => {
            state.set_mounted(true);
            autostart(&mut state, cache, &mut effects);
        }
        Msg::Execute => {
            if state.can_begin() {
                begin(&mut state, cache, &mut effects);
            } else {
                ws_debug!(
                    "execute ignored for {} (phase={:?}, enabled={})",
                    state.request(),
                    state.phase(),
                    state.options().enabled
                );
            }
        }
        Msg::Refetch => {
            if state.can_refetch() {
                if state.phase().is_terminal() {
                    ws_debug!("refetching terminal session {}", state.session());
                } else {
                    // The pending timer is superseded by the refetch.
                    effects.push(Effect::StopPolling {
                        session: state.session(),
                    });
                }
                issue_poll(&mut state, &mut effects);
            }
        }
        Msg::RequestChanged(request) => {
            if request != *state.request() {
                stop_active(&state, &mut effects);
                ws_debug!("request changed {} -> {}", state.request(), request);
                state.switch_request(request);
                autostart(&mut state, cache, &mut effects);
            }
        }
        Msg::EnabledChanged(enabled) => {
            if enabled != state.options().enabled {
                state.set_enabled(enabled);
                if enabled {
                    autostart(&mut state, cache, &mut effects);
                } else if state.phase().is_active() {
                    stop_active(&state, &mut effects);
                    state.abandon();
                }
            }
        }
        Msg::PollDue { session, tick } => {
            if state.is_current(session)
                && state.phase() == Phase::Polling
                && state.options().enabled
                && !state.poll_in_flight()
                && state.expects_tick(tick)
            {
                issue_poll(&mut state, &mut effects);
            } else {
                ws_debug!("dropping poll tick {tick} for session {session}");
            }
        }
        Msg::SubmitCompleted { session, result } => {
            if !state.is_current(session) || state.phase() != Phase::Submitting {
                discard("submit", session, &state);
                return (state, effects);
            }
            match result {
                Ok(accepted) => {
                    if let Some(message) = accepted.message {
                        effects.push(Effect::Notify(Notification::success(message)));
                    }
                    state.mark_accepted();
                    issue_poll(&mut state, &mut effects);
                }
                Err(err) => {
                    if !err.is_validation() {
                        effects.push(Effect::Notify(Notification::error(err.message.clone())));
                    }
                    state.fail(ProcedureError::Submission(err));
                }
            }
        }
        Msg::PollCompleted { session, result } => {
            if !state.is_current(session) || !state.poll_in_flight() {
                discard("poll", session, &state);
                return (state, effects);
            }
            state.finish_poll();
            match result {
                Ok(RemoteStatus::NotStarted | RemoteStatus::Running) => {
                    state.mark_polling();
                    schedule_poll(&mut state, &mut effects);
                }
                Ok(RemoteStatus::Succeeded(payload)) => {
                    effects.push(Effect::StoreResult {
                        request: state.request().clone(),
                        payload: payload.clone(),
                    });
                    effects.push(Effect::StopPolling { session });
                    state.succeed(payload);
                }
                Ok(RemoteStatus::Failed(failure)) => {
                    effects.push(Effect::Notify(Notification::error(failure.message.clone())));
                    effects.push(Effect::StopPolling { session });
                    state.fail(ProcedureError::Remote(failure));
                }
                Err(err) => poll_failed(&mut state, err, &mut effects),
            }
        }
        Msg::Cancel => {
            stop_active(&state, &mut effects);
            state.teardown();
        }
        Msg::NoOp => {}
    }

    (state, effects)
}

fn autostart(state: &mut ProcedureState, cache: &dyn ResultCache, effects: &mut Vec<Effect>) {
    if state.wants_autostart() {
        begin(state, cache, effects);
    }
}

/// Opens a session: a fresh cached result short-circuits to `Succeeded`,
/// anything else goes to the remote.
fn begin(state: &mut ProcedureState, cache: &dyn ResultCache, effects: &mut Vec<Effect>) {
    let session = state.begin_session();
    if let Some(cached) = cache.lookup(state.request()).filter(|cached| !cached.stale) {
        ws_debug!("session {session}: cache hit for {}", state.request());
        state.succeed(cached.payload);
        return;
    }
    ws_debug!("session {session}: submitting {}", state.request());
    state.mark_submitting();
    effects.push(Effect::Submit {
        session,
        request: state.request().clone(),
    });
}

fn issue_poll(state: &mut ProcedureState, effects: &mut Vec<Effect>) {
    state.start_poll();
    effects.push(Effect::Poll {
        session: state.session(),
        request: state.request().clone(),
    });
}

fn schedule_poll(state: &mut ProcedureState, effects: &mut Vec<Effect>) {
    let tick = state.next_tick();
    effects.push(Effect::SchedulePoll {
        session: state.session(),
        tick,
        after: state.options().poll_interval(),
    });
}

fn poll_failed(state: &mut ProcedureState, err: PollError, effects: &mut Vec<Effect>) {
    let failures = state.record_poll_failure();
    ws_warn!(
        "session {}: poll attempt failed ({failures} so far): {}",
        state.session(),
        err.message
    );
    // A failed refetch after a terminal result leaves that result in place.
    if state.phase() == Phase::Polling {
        schedule_poll(state, effects);
    }
}

fn stop_active(state: &ProcedureState, effects: &mut Vec<Effect>) {
    if state.phase().is_active() {
        effects.push(Effect::StopPolling {
            session: state.session(),
        });
    }
}

fn discard(kind: &str, session: SessionId, state: &ProcedureState) {
    ws_debug!(
        "discarding stale {kind} completion for session {session} (current {}, phase {:?})",
        state.session(),
        state.phase()
    );
}
