//! Verifier core: form state machine, lookup and submission coordination, and
//! result view-model helpers. No I/O happens here.
use std::time::Duration;

mod effect;
mod field;
mod history;
mod lookup;
mod msg;
mod results;
mod state;
pub mod strings;
mod submission;
mod update;
mod vat_format;
mod verification;
mod view_model;

/// Identifies one lookup, submission or highlight. Issued from a single
/// monotonically increasing counter per [`AppState`].
pub type RequestToken = u64;

/// Quiet period after a VAT commit before the lookup is issued.
pub const LOOKUP_DEBOUNCE: Duration = Duration::from_millis(250);
/// How long an autofilled field stays highlighted.
pub const AUTOFILL_HIGHLIGHT: Duration = Duration::from_millis(3500);

pub use effect::Effect;
pub use field::{
    Feedback, FieldId, FieldKind, FieldTracker, FormField, ALL_FIELDS, REQUIRED_FIELDS,
};
pub use history::{HistoryDraft, HistoryEntry, HistoryLog, HISTORY_LIMIT};
pub use lookup::{
    normalize_vat, CommitDecision, LookupCoordinator, LookupFeedback, LookupMessage,
    LookupOutcome, LookupPayload, LookupPhase, LookupQuery, MessageLevel, Prefill,
    MIN_LOOKUP_LEN,
};
pub use msg::Msg;
pub use results::{
    build_quota_view, build_results_view, Detail, QuotaView, ResultsView, ServiceSection,
    StatusBadge, Tone,
};
pub use state::AppState;
pub use submission::{
    validate_required, ResultsPanel, SubmissionController, SubmitOutcome, SubmitPhase,
    ValidationError,
};
pub use update::{normalize_domain, update};
pub use vat_format::{check_vat_format, format_hint, FormatCheck};
pub use verification::{
    OverallStatus, QuotaLimit, QuotaNotice, ServiceResult, ServiceStatus, VerificationRequest,
    VerificationResult,
};
pub use view_model::{AppViewModel, FieldView, ResultsPanelView};
