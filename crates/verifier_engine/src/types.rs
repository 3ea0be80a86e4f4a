use verifier_core::{
    FieldId, LookupMessage, LookupOutcome, LookupPayload, Msg, QuotaNotice, RequestToken,
    SubmitOutcome, VerificationResult,
};

/// Completion reported by the engine worker. Every command that expects an
/// answer produces exactly one event carrying its token.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    LookupFinished {
        token: RequestToken,
        outcome: LookupOutcome,
    },
    VerifyFinished {
        token: RequestToken,
        outcome: SubmitOutcome,
    },
    TimerFired(Timer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    LookupDebounce { token: RequestToken },
    HighlightClear { field: FieldId, token: RequestToken },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {status}")]
    HttpStatus { status: u16 },
    #[error("invalid response body: {0}")]
    InvalidBody(String),
    #[error("response too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("{}", .error.as_deref().unwrap_or("request rejected"))]
    Domain {
        error: Option<String>,
        messages: Vec<LookupMessage>,
    },
    #[error("verification quota exhausted on plan {}", .0.plan)]
    QuotaExceeded(QuotaNotice),
    #[error("session expired, redirecting to {redirect}")]
    AuthExpired { redirect: String },
    #[error("cancelled")]
    Cancelled,
}

/// Folds a lookup result into the outcome the core state machine expects.
pub fn lookup_outcome(result: Result<LookupPayload, ClientError>) -> LookupOutcome {
    match result {
        Ok(payload) => LookupOutcome::Prefilled(payload),
        Err(ClientError::Domain { error, messages }) => LookupOutcome::Rejected { error, messages },
        Err(err @ ClientError::QuotaExceeded(_)) => LookupOutcome::Rejected {
            error: Some(err.to_string()),
            messages: Vec::new(),
        },
        Err(ClientError::AuthExpired { redirect }) => LookupOutcome::AuthExpired { redirect },
        Err(ClientError::Cancelled) => LookupOutcome::Cancelled,
        Err(err) => LookupOutcome::TransportFailed {
            message: err.to_string(),
        },
    }
}

/// Folds a verification result into the outcome the core state machine expects.
pub fn submit_outcome(result: Result<VerificationResult, ClientError>) -> SubmitOutcome {
    match result {
        Ok(result) => SubmitOutcome::Verified(result),
        Err(ClientError::QuotaExceeded(notice)) => SubmitOutcome::QuotaExceeded(notice),
        Err(ClientError::Domain { error, .. }) => SubmitOutcome::Rejected { error },
        Err(ClientError::AuthExpired { redirect }) => SubmitOutcome::AuthExpired { redirect },
        Err(err) => SubmitOutcome::TransportFailed {
            message: err.to_string(),
        },
    }
}

impl From<Timer> for Msg {
    fn from(timer: Timer) -> Self {
        match timer {
            Timer::LookupDebounce { token } => Msg::LookupDebounceElapsed { token },
            Timer::HighlightClear { field, token } => Msg::HighlightExpired { field, token },
        }
    }
}

impl From<EngineEvent> for Msg {
    fn from(event: EngineEvent) -> Self {
        match event {
            EngineEvent::LookupFinished { token, outcome } => {
                Msg::LookupCompleted { token, outcome }
            }
            EngineEvent::VerifyFinished { token, outcome } => {
                Msg::SubmitCompleted { token, outcome }
            }
            EngineEvent::TimerFired(timer) => timer.into(),
        }
    }
}
