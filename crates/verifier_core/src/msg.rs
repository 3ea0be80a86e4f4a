use crate::{FieldId, LookupOutcome, RequestToken, SubmitOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Form rendered with its initial values; edit state is derived once from these.
    FormAttached(Vec<(FieldId, String)>),
    /// User typed into or selected a value in a field.
    FieldInput { field: FieldId, value: String },
    /// User left a field (blur) or otherwise committed its value.
    FieldCommitted(FieldId),
    /// Debounce timer for a VAT commit fired.
    LookupDebounceElapsed { token: RequestToken },
    /// VAT lookup finished, failed or was aborted.
    LookupCompleted {
        token: RequestToken,
        outcome: LookupOutcome,
    },
    /// Autofill highlight timer fired.
    HighlightExpired { field: FieldId, token: RequestToken },
    /// User clicked the submit button.
    SubmitClicked,
    /// Verification request finished, whatever the result.
    SubmitCompleted {
        token: RequestToken,
        outcome: SubmitOutcome,
    },
}
