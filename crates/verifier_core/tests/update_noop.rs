use std::sync::Once;

use verifier_core::{update, AppState, FieldId, LookupOutcome, Msg, SubmitOutcome};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(verifier_logging::initialize_for_tests);
}

#[test]
fn unknown_tokens_are_noops() {
    init_logging();
    let state = AppState::new();
    let stale = [
        Msg::LookupDebounceElapsed { token: 7 },
        Msg::LookupCompleted {
            token: 7,
            outcome: LookupOutcome::Cancelled,
        },
        Msg::HighlightExpired {
            field: FieldId::CounterpartyName,
            token: 7,
        },
        Msg::SubmitCompleted {
            token: 7,
            outcome: SubmitOutcome::Rejected { error: None },
        },
    ];

    for msg in stale {
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}

#[test]
fn unchanged_input_is_noop() {
    init_logging();
    let (mut state, _) = update(
        AppState::new(),
        Msg::FormAttached(vec![(FieldId::CompanyName, "Muster AG".to_string())]),
    );
    assert!(state.consume_dirty());

    let (next, effects) = update(
        state.clone(),
        Msg::FieldInput {
            field: FieldId::CompanyName,
            value: "Muster AG".to_string(),
        },
    );
    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn committing_other_fields_does_nothing() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::FieldCommitted(FieldId::CompanyEmail));
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
