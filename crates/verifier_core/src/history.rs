use serde::{Deserialize, Serialize};

use crate::field::FieldId;
use crate::verification::{OverallStatus, VerificationRequest, VerificationResult};

pub const HISTORY_LIMIT: usize = 10;

/// History record before the store stamps it with a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryDraft {
    pub company_name: String,
    pub counterparty_name: String,
    pub counterparty_country: String,
    pub overall_status: OverallStatus,
    pub confidence_score: f64,
    pub check_id: String,
}

impl HistoryDraft {
    pub fn from_submission(request: &VerificationRequest, result: &VerificationResult) -> Self {
        Self {
            company_name: request.get(FieldId::CompanyName).to_string(),
            counterparty_name: request.get(FieldId::CounterpartyName).to_string(),
            counterparty_country: request.get(FieldId::CounterpartyCountry).to_string(),
            overall_status: result.overall_status,
            confidence_score: result.confidence_score,
            check_id: result.check_id.clone(),
        }
    }

    pub fn stamp(self, timestamp: impl Into<String>) -> HistoryEntry {
        HistoryEntry {
            timestamp: timestamp.into(),
            company_name: self.company_name,
            counterparty_name: self.counterparty_name,
            counterparty_country: self.counterparty_country,
            overall_status: self.overall_status,
            confidence_score: self.confidence_score,
            check_id: self.check_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub counterparty_name: String,
    #[serde(default)]
    pub counterparty_country: String,
    #[serde(default)]
    pub overall_status: OverallStatus,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "crate::verification::opaque_id")]
    pub check_id: String,
}

/// Newest-first log of past verifications, never longer than [`HISTORY_LIMIT`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Builds a log from stored entries (already newest-first), dropping any
    /// overflow.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        Self { entries }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
