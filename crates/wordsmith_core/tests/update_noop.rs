use wordsmith_core::{update, InMemoryResultCache, Msg, ProcedureOptions, ProcedureRequest, ProcedureState};

#[test]
fn update_is_noop() {
    let cache = InMemoryResultCache::default();
    let state = ProcedureState::new(
        ProcedureRequest::topic_evaluation("p1", Some("text")),
        ProcedureOptions::default(),
    );
    let (next, effects) = update(state.clone(), Msg::NoOp, &cache);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
