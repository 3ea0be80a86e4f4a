use std::time::Duration;

use crate::{FieldId, HistoryDraft, LookupQuery, RequestToken, VerificationRequest};

/// Work the host must perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver `Msg::LookupDebounceElapsed { token }` after `after`.
    ScheduleLookup { token: RequestToken, after: Duration },
    /// Issue the VAT lookup and report `Msg::LookupCompleted` with the same token.
    StartLookup { token: RequestToken, query: LookupQuery },
    /// Abort the transport of a superseded lookup.
    CancelLookup { token: RequestToken },
    /// Deliver `Msg::HighlightExpired` after `after`.
    ScheduleHighlightClear {
        field: FieldId,
        token: RequestToken,
        after: Duration,
    },
    FocusField(FieldId),
    /// Send the form and report exactly one `Msg::SubmitCompleted`.
    SubmitVerification {
        token: RequestToken,
        request: VerificationRequest,
    },
    RecordHistory(HistoryDraft),
    /// Leave the form, e.g. for the login page.
    Navigate { target: String },
}
