use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use verifier_core::{LookupQuery, RequestToken, SubmitOutcome, VerificationRequest};
use verifier_logging::{verifier_debug, verifier_info};

use crate::client::VerificationBackend;
use crate::types::{lookup_outcome, submit_outcome};
use crate::{ClientError, EngineEvent, Timer};

enum EngineCommand {
    Lookup {
        token: RequestToken,
        query: LookupQuery,
    },
    CancelLookup {
        token: RequestToken,
    },
    Verify {
        token: RequestToken,
        request: VerificationRequest,
    },
    Schedule {
        timer: Timer,
        after: Duration,
    },
}

/// Owns the worker thread that runs backend calls and timers on a tokio
/// runtime. Commands go in over one channel, [`EngineEvent`]s come back over
/// another.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn VerificationBackend>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("verifier-engine".to_string())
            .spawn(move || {
                let mut active_lookup: Option<(RequestToken, CancellationToken)> = None;
                while let Ok(command) = cmd_rx.recv() {
                    handle_command(
                        &runtime,
                        &backend,
                        &event_tx,
                        &mut active_lookup,
                        command,
                    );
                }
                verifier_debug!("engine command channel closed; worker exiting");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    /// Starts a lookup. A lookup still running is cancelled first, so at most
    /// one is ever live.
    pub fn start_lookup(&self, token: RequestToken, query: LookupQuery) {
        self.send(EngineCommand::Lookup { token, query });
    }

    pub fn cancel_lookup(&self, token: RequestToken) {
        self.send(EngineCommand::CancelLookup { token });
    }

    pub fn verify(&self, token: RequestToken, request: VerificationRequest) {
        self.send(EngineCommand::Verify { token, request });
    }

    pub fn schedule(&self, timer: Timer, after: Duration) {
        self.send(EngineCommand::Schedule { timer, after });
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            verifier_debug!("engine worker gone; command dropped");
        }
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    backend: &Arc<dyn VerificationBackend>,
    event_tx: &mpsc::Sender<EngineEvent>,
    active_lookup: &mut Option<(RequestToken, CancellationToken)>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::Lookup { token, query } => {
            if let Some((previous, cancel)) = active_lookup.take() {
                verifier_debug!("lookup {previous} superseded by {token}");
                cancel.cancel();
            }
            let cancel = CancellationToken::new();
            *active_lookup = Some((token, cancel.clone()));

            let backend = Arc::clone(backend);
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(ClientError::Cancelled),
                    result = backend.lookup_vat(&query) => result,
                };
                let _ = event_tx.send(EngineEvent::LookupFinished {
                    token,
                    outcome: lookup_outcome(result),
                });
            });
        }
        EngineCommand::CancelLookup { token } => {
            if active_lookup.as_ref().is_some_and(|(live, _)| *live == token) {
                if let Some((_, cancel)) = active_lookup.take() {
                    verifier_debug!("cancelling lookup {token}");
                    cancel.cancel();
                }
            }
        }
        EngineCommand::Verify { token, request } => {
            verifier_info!("verification {token} started");
            let backend = Arc::clone(backend);
            let completion = VerifyCompletion::new(token, event_tx.clone());
            runtime.spawn(async move {
                let result = backend.verify(&request).await;
                completion.finish(submit_outcome(result));
            });
        }
        EngineCommand::Schedule { timer, after } => {
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                tokio::time::sleep(after).await;
                let _ = event_tx.send(EngineEvent::TimerFired(timer));
            });
        }
    }
}

/// Reports the end of a verification exactly once, including when the task
/// is dropped before finishing (panic or runtime shutdown).
struct VerifyCompletion {
    token: RequestToken,
    event_tx: mpsc::Sender<EngineEvent>,
    outcome: Option<SubmitOutcome>,
}

impl VerifyCompletion {
    fn new(token: RequestToken, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            token,
            event_tx,
            outcome: None,
        }
    }

    fn finish(mut self, outcome: SubmitOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for VerifyCompletion {
    fn drop(&mut self) {
        let outcome = self
            .outcome
            .take()
            .unwrap_or_else(|| SubmitOutcome::TransportFailed {
                message: "verification aborted".to_string(),
            });
        verifier_info!("verification {} finished", self.token);
        let _ = self.event_tx.send(EngineEvent::VerifyFinished {
            token: self.token,
            outcome,
        });
    }
}
