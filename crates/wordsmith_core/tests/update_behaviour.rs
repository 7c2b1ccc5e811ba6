use std::sync::Once;

use pretty_assertions::assert_eq;
use wordsmith_core::{
    update, Accepted, Effect, InMemoryResultCache, Msg, Phase, ProcedureOptions,
    ProcedureRequest, ProcedureState, ProcedureStatus, RemoteStatus, SessionId,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(wordsmith_logging::initialize_for_tests);
}

fn evaluation(column: Option<&str>) -> ProcedureRequest {
    ProcedureRequest::topic_evaluation("p1", column)
}

fn submitted_session(effects: &[Effect]) -> Option<SessionId> {
    effects.iter().find_map(|effect| match effect {
        Effect::Submit { session, .. } => Some(*session),
        _ => None,
    })
}

#[test]
fn autostart_submits_once_mounted() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let state = ProcedureState::new(evaluation(Some("text")), ProcedureOptions::default());

    let (mut state, effects) = update(state, Msg::Start, &cache);
    let session = state.session();

    assert_eq!(
        effects,
        vec![Effect::Submit {
            session,
            request: evaluation(Some("text")),
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::Submitting);
    assert_eq!(view.status, ProcedureStatus::Running);
    assert!(view.is_pending);
    assert!(state.consume_dirty());
}

#[test]
fn nothing_is_submitted_before_start() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let state = ProcedureState::new(evaluation(None), ProcedureOptions::default());

    let (state, effects) = update(state, Msg::RequestChanged(evaluation(Some("text"))), &cache);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);

    let (_state, effects) = update(state, Msg::Start, &cache);
    assert!(submitted_session(&effects).is_some());
}

#[test]
fn disabled_controller_ignores_execute_and_autostart() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let options = ProcedureOptions::default().with_enabled(false);
    let state = ProcedureState::new(evaluation(Some("text")), options);
    let session_before = state.session();

    let (state, effects) = update(state, Msg::Start, &cache);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::Execute, &cache);
    assert!(effects.is_empty());

    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.status(), &ProcedureStatus::NotStarted);
    assert_eq!(state.session(), session_before);
}

#[test]
fn enabling_later_triggers_autostart() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let options = ProcedureOptions::default().with_enabled(false);
    let state = ProcedureState::new(evaluation(Some("text")), options);

    let (state, _) = update(state, Msg::Start, &cache);
    let (state, effects) = update(state, Msg::EnabledChanged(true), &cache);

    assert_eq!(submitted_session(&effects), Some(state.session()));
    assert_eq!(state.phase(), Phase::Submitting);
}

#[test]
fn without_autostart_only_execute_submits() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let options = ProcedureOptions::default().with_autostart(false);
    let state = ProcedureState::new(evaluation(Some("text")), options);

    let (state, effects) = update(state, Msg::Start, &cache);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::RequestChanged(evaluation(Some("title"))), &cache);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::Execute, &cache);
    assert_eq!(
        effects,
        vec![Effect::Submit {
            session: state.session(),
            request: evaluation(Some("title")),
        }]
    );
}

#[test]
fn incomplete_request_is_not_actionable_and_not_an_error() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let state = ProcedureState::new(evaluation(None), ProcedureOptions::default());

    let (state, effects) = update(state, Msg::Start, &cache);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::Execute, &cache);
    assert!(effects.is_empty());
    assert_eq!(state.status(), &ProcedureStatus::NotStarted);
    assert!(state.view().field_errors.is_empty());

    // Becoming valid starts the session automatically.
    let (state, effects) = update(state, Msg::RequestChanged(evaluation(Some("text"))), &cache);
    assert_eq!(submitted_session(&effects), Some(state.session()));
}

#[test]
fn execute_is_deduplicated_while_active() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let state = ProcedureState::new(evaluation(Some("text")), ProcedureOptions::default());

    let (state, _) = update(state, Msg::Start, &cache);
    let session = state.session();
    let (state, effects) = update(state, Msg::Execute, &cache);
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::SubmitCompleted {
            session,
            result: Ok(Accepted::default()),
        },
        &cache,
    );
    let (state, effects) = update(state, Msg::Execute, &cache);
    assert!(effects.is_empty());
    assert_eq!(state.session(), session);
    assert_eq!(state.phase(), Phase::Polling);
}

#[test]
fn same_request_is_not_a_key_change() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let state = ProcedureState::new(evaluation(Some("text")), ProcedureOptions::default());
    let (state, _) = update(state, Msg::Start, &cache);
    let session = state.session();

    let (state, effects) = update(state, Msg::RequestChanged(evaluation(Some("text"))), &cache);
    assert!(effects.is_empty());
    assert_eq!(state.session(), session);
    assert_eq!(state.phase(), Phase::Submitting);
}

#[test]
fn disabling_mid_poll_stops_and_discards_late_results() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let state = ProcedureState::new(evaluation(Some("text")), ProcedureOptions::default());
    let (state, _) = update(state, Msg::Start, &cache);
    let session = state.session();
    let (state, effects) = update(
        state,
        Msg::SubmitCompleted {
            session,
            result: Ok(Accepted::default()),
        },
        &cache,
    );
    assert!(matches!(effects.as_slice(), [Effect::Poll { .. }]));

    let (state, effects) = update(state, Msg::EnabledChanged(false), &cache);
    assert_eq!(effects, vec![Effect::StopPolling { session }]);
    assert_eq!(state.phase(), Phase::Idle);

    let (state, effects) = update(
        state,
        Msg::PollCompleted {
            session,
            result: Ok(RemoteStatus::Running),
        },
        &cache,
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().poll_count, 0);
}

#[test]
fn cancel_tears_down_the_session() {
    init_logging();
    let cache = InMemoryResultCache::default();
    let state = ProcedureState::new(evaluation(Some("text")), ProcedureOptions::default());
    let (state, _) = update(state, Msg::Start, &cache);
    let session = state.session();

    let (state, effects) = update(state, Msg::Cancel, &cache);
    assert_eq!(effects, vec![Effect::StopPolling { session }]);
    assert!(!state.is_mounted());
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().data, None);

    let (state, effects) = update(
        state,
        Msg::SubmitCompleted {
            session,
            result: Ok(Accepted::default()),
        },
        &cache,
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
}
