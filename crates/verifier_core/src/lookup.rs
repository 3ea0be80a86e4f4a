use serde::{Deserialize, Serialize};

use crate::field::FieldId;
use crate::RequestToken;

/// Shortest normalized VAT input that is worth a lookup.
pub const MIN_LOOKUP_LEN: usize = 4;

/// Body of one `/api/vat-lookup` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupQuery {
    pub vat_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Warning,
    Danger,
    #[default]
    #[serde(other)]
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LookupMessage {
    #[serde(default)]
    pub level: MessageLevel,
    pub text: String,
}

impl LookupMessage {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Enrichment values offered by a lookup. Keys the form has no field for are
/// dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Prefill {
    #[serde(default)]
    pub counterparty_vat: Option<String>,
    #[serde(default)]
    pub counterparty_name: Option<String>,
    #[serde(default)]
    pub counterparty_address: Option<String>,
    #[serde(default)]
    pub counterparty_country: Option<String>,
    #[serde(default)]
    pub counterparty_domain: Option<String>,
}

impl Prefill {
    /// Non-empty offered values, in the order they are applied.
    pub fn entries(&self) -> Vec<(FieldId, &str)> {
        [
            (FieldId::CounterpartyVat, &self.counterparty_vat),
            (FieldId::CounterpartyName, &self.counterparty_name),
            (FieldId::CounterpartyAddress, &self.counterparty_address),
            (FieldId::CounterpartyCountry, &self.counterparty_country),
            (FieldId::CounterpartyDomain, &self.counterparty_domain),
        ]
        .into_iter()
        .filter_map(|(id, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (id, v))
        })
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LookupPayload {
    #[serde(default)]
    pub prefill: Prefill,
    #[serde(default)]
    pub messages: Vec<LookupMessage>,
}

/// How one lookup request ended, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Prefilled(LookupPayload),
    Rejected {
        error: Option<String>,
        messages: Vec<LookupMessage>,
    },
    TransportFailed {
        message: String,
    },
    AuthExpired {
        redirect: String,
    },
    Cancelled,
}

/// What the lookup area under the VAT input shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFeedback {
    Searching,
    Messages(Vec<LookupMessage>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LookupPhase {
    #[default]
    Idle,
    Debounced {
        token: RequestToken,
        query: LookupQuery,
    },
    InFlight {
        token: RequestToken,
        query: LookupQuery,
    },
}

/// Result of committing the VAT input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitDecision {
    /// Input too short: back to idle, feedback cleared.
    TooShort { cancelled: Option<RequestToken> },
    /// Same VAT as the last applied lookup; nothing to fetch.
    AlreadyApplied { cancelled: Option<RequestToken> },
    /// An identical query is already debounced or in flight.
    AlreadyPending,
    /// A new lookup was debounced; `cancelled` is the in-flight request it supersedes.
    Scheduled {
        token: RequestToken,
        cancelled: Option<RequestToken>,
    },
}

/// Debounced, cancellable VAT lookup pipeline.
///
/// Only the request recorded in [`LookupPhase::InFlight`] may ever have its
/// response applied; anything else reaching [`LookupCoordinator::resolve`] is
/// stale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupCoordinator {
    phase: LookupPhase,
    last_applied_vat: Option<String>,
    feedback: Option<LookupFeedback>,
}

pub fn normalize_vat(raw: &str) -> String {
    raw.trim().to_uppercase()
}

impl LookupCoordinator {
    pub fn phase(&self) -> &LookupPhase {
        &self.phase
    }

    pub fn feedback(&self) -> Option<&LookupFeedback> {
        self.feedback.as_ref()
    }

    pub fn last_applied_vat(&self) -> Option<&str> {
        self.last_applied_vat.as_deref()
    }

    /// Handles a commit (blur) of the VAT input. `next_token` is only consumed
    /// when a new lookup is scheduled.
    pub fn commit(
        &mut self,
        raw_vat: &str,
        country: &str,
        next_token: impl FnOnce() -> RequestToken,
    ) -> CommitDecision {
        let vat_number = normalize_vat(raw_vat);
        if vat_number.chars().count() < MIN_LOOKUP_LEN {
            self.feedback = None;
            return CommitDecision::TooShort {
                cancelled: self.abandon(),
            };
        }

        if self.last_applied_vat.as_deref() == Some(vat_number.as_str()) {
            return CommitDecision::AlreadyApplied {
                cancelled: self.abandon(),
            };
        }

        let country = country.trim().to_uppercase();
        let query = LookupQuery {
            vat_number,
            country_code: (!country.is_empty()).then_some(country),
        };

        if self.pending_query() == Some(&query) {
            return CommitDecision::AlreadyPending;
        }

        let cancelled = self.abandon();
        let token = next_token();
        self.phase = LookupPhase::Debounced { token, query };
        CommitDecision::Scheduled { token, cancelled }
    }

    /// Debounce timer fired. Returns the query to issue if `token` is still
    /// the latest commit.
    pub fn debounce_elapsed(&mut self, token: RequestToken) -> Option<LookupQuery> {
        match std::mem::take(&mut self.phase) {
            LookupPhase::Debounced { token: pending, query } if pending == token => {
                self.phase = LookupPhase::InFlight {
                    token,
                    query: query.clone(),
                };
                self.feedback = Some(LookupFeedback::Searching);
                Some(query)
            }
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Claims the in-flight request if `token` identifies it, returning the
    /// coordinator to idle. `None` means the response is stale.
    pub fn resolve(&mut self, token: RequestToken) -> Option<LookupQuery> {
        match std::mem::take(&mut self.phase) {
            LookupPhase::InFlight { token: current, query } if current == token => Some(query),
            other => {
                self.phase = other;
                None
            }
        }
    }

    pub fn record_applied(&mut self, vat_number: String, messages: Vec<LookupMessage>) {
        self.last_applied_vat = Some(vat_number);
        self.feedback = Some(LookupFeedback::Messages(messages));
    }

    pub fn record_failure(&mut self, messages: Vec<LookupMessage>) {
        self.last_applied_vat = None;
        self.feedback = Some(LookupFeedback::Messages(messages));
    }

    pub fn clear_feedback(&mut self) {
        self.feedback = None;
    }

    /// A different country was chosen: the same VAT may be looked up again.
    pub fn forget_applied(&mut self) {
        self.last_applied_vat = None;
    }

    fn pending_query(&self) -> Option<&LookupQuery> {
        match &self.phase {
            LookupPhase::Idle => None,
            LookupPhase::Debounced { query, .. } | LookupPhase::InFlight { query, .. } => {
                Some(query)
            }
        }
    }

    /// Drops any debounced or in-flight request. Returns the in-flight token so
    /// its transport can be cancelled too.
    fn abandon(&mut self) -> Option<RequestToken> {
        match std::mem::take(&mut self.phase) {
            LookupPhase::InFlight { token, .. } => {
                if self.feedback == Some(LookupFeedback::Searching) {
                    self.feedback = None;
                }
                Some(token)
            }
            LookupPhase::Debounced { .. } | LookupPhase::Idle => None,
        }
    }
}
