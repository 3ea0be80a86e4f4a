use std::sync::{Arc, Once};
use std::time::Duration;

use verifier_core::{
    FieldId, LookupOutcome, LookupPayload, LookupQuery, Msg, SubmitOutcome, VerificationRequest,
    VerificationResult,
};
use verifier_engine::{ClientError, EngineEvent, EngineHandle, Timer, VerificationBackend};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(verifier_logging::initialize_for_tests);
}

/// Lookups for "SLOW…" numbers hang until cancelled; verification panics
/// when the request has no company name.
#[derive(Default)]
struct ScriptedBackend;

#[async_trait::async_trait]
impl VerificationBackend for ScriptedBackend {
    async fn lookup_vat(&self, query: &LookupQuery) -> Result<LookupPayload, ClientError> {
        if query.vat_number.starts_with("SLOW") {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(LookupPayload::default())
    }

    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResult, ClientError> {
        if request.get(FieldId::CompanyName).is_empty() {
            panic!("backend exploded");
        }
        Ok(VerificationResult::default())
    }
}

fn query(vat: &str) -> LookupQuery {
    LookupQuery {
        vat_number: vat.to_string(),
        country_code: None,
    }
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine
        .recv_timeout(Duration::from_secs(5))
        .expect("engine event")
}

#[test]
fn new_lookup_cancels_the_running_one() {
    init_logging();
    let engine = EngineHandle::new(Arc::new(ScriptedBackend)).expect("engine");

    engine.start_lookup(1, query("SLOW123456"));
    std::thread::sleep(Duration::from_millis(50));
    engine.start_lookup(2, query("DE123456789"));

    let mut events = vec![next_event(&engine), next_event(&engine)];
    events.sort_by_key(|event| match event {
        EngineEvent::LookupFinished { token, .. } => *token,
        _ => u64::MAX,
    });
    assert_eq!(
        events,
        vec![
            EngineEvent::LookupFinished {
                token: 1,
                outcome: LookupOutcome::Cancelled,
            },
            EngineEvent::LookupFinished {
                token: 2,
                outcome: LookupOutcome::Prefilled(LookupPayload::default()),
            },
        ]
    );
}

#[test]
fn explicit_cancel_reports_cancelled() {
    init_logging();
    let engine = EngineHandle::new(Arc::new(ScriptedBackend)).expect("engine");

    engine.start_lookup(5, query("SLOW999999"));
    engine.cancel_lookup(4);
    engine.cancel_lookup(5);

    assert_eq!(
        next_event(&engine),
        EngineEvent::LookupFinished {
            token: 5,
            outcome: LookupOutcome::Cancelled,
        }
    );
}

#[test]
fn verification_always_reports_completion() {
    init_logging();
    let engine = EngineHandle::new(Arc::new(ScriptedBackend)).expect("engine");

    engine.verify(
        1,
        VerificationRequest::new(vec![(FieldId::CompanyName, "Muster AG".to_string())]),
    );
    assert_eq!(
        next_event(&engine),
        EngineEvent::VerifyFinished {
            token: 1,
            outcome: SubmitOutcome::Verified(VerificationResult::default()),
        }
    );

    engine.verify(2, VerificationRequest::new(Vec::new()));
    assert_eq!(
        next_event(&engine),
        EngineEvent::VerifyFinished {
            token: 2,
            outcome: SubmitOutcome::TransportFailed {
                message: "verification aborted".to_string(),
            },
        }
    );
}

#[test]
fn timers_fire_as_messages() {
    init_logging();
    let engine = EngineHandle::new(Arc::new(ScriptedBackend)).expect("engine");

    engine.schedule(
        Timer::HighlightClear {
            field: FieldId::CounterpartyName,
            token: 3,
        },
        Duration::from_millis(20),
    );
    engine.schedule(Timer::LookupDebounce { token: 2 }, Duration::from_millis(5));

    let first: Msg = next_event(&engine).into();
    let second: Msg = next_event(&engine).into();
    assert_eq!(first, Msg::LookupDebounceElapsed { token: 2 });
    assert_eq!(
        second,
        Msg::HighlightExpired {
            field: FieldId::CounterpartyName,
            token: 3,
        }
    );
}
