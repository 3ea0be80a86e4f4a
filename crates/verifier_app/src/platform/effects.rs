use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use verifier_core::{Effect, Msg};
use verifier_engine::{EngineHandle, HistoryStore, Timer};
use verifier_logging::{verifier_debug, verifier_info};

use super::app::AppEvent;

/// Executes core effects against the engine and the history store, and feeds
/// engine completions back into the app loop.
pub struct EffectRunner {
    engine: EngineHandle,
    history: HistoryStore,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, history: HistoryStore, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let runner = Self { engine, history };
        runner.spawn_event_loop(event_tx);
        runner
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Runs every effect it can. Navigation and focus belong to the host and
    /// are handed back.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut host = Vec::new();
        for effect in effects {
            match effect {
                Effect::ScheduleLookup { token, after } => {
                    self.engine.schedule(Timer::LookupDebounce { token }, after);
                }
                Effect::StartLookup { token, query } => {
                    verifier_info!("StartLookup token={} vat={}", token, query.vat_number);
                    self.engine.start_lookup(token, query);
                }
                Effect::CancelLookup { token } => self.engine.cancel_lookup(token),
                Effect::ScheduleHighlightClear {
                    field,
                    token,
                    after,
                } => {
                    self.engine
                        .schedule(Timer::HighlightClear { field, token }, after);
                }
                Effect::SubmitVerification { token, request } => {
                    verifier_info!("SubmitVerification token={}", token);
                    self.engine.verify(token, request);
                }
                Effect::RecordHistory(draft) => self.history.record(draft),
                Effect::FocusField(_) | Effect::Navigate { .. } => host.push(effect),
            }
        }
        host
    }

    fn spawn_event_loop(&self, event_tx: mpsc::Sender<AppEvent>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.recv_timeout(Duration::from_millis(100)) {
                verifier_debug!("engine event {:?}", event);
                if event_tx.send(AppEvent::Core(Msg::from(event))).is_err() {
                    break;
                }
            }
        });
    }
}
