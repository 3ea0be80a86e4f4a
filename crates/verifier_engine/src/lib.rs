//! Verifier engine: backend client, effect execution and history storage.
mod classify;
mod client;
mod engine;
mod history_store;
mod types;

pub use classify::{classify_lookup, classify_verification};
pub use client::{resolve_redirect, ClientSettings, ReqwestBackend, VerificationBackend};
pub use engine::EngineHandle;
pub use history_store::{Clock, HistoryError, HistoryStore, HISTORY_FILE};
pub use types::{lookup_outcome, submit_outcome, ClientError, EngineEvent, Timer};
