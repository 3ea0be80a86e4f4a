use crate::field::{Feedback, FieldId, FieldTracker, REQUIRED_FIELDS};
use crate::strings;
use crate::verification::{QuotaNotice, VerificationRequest, VerificationResult};
use crate::RequestToken;

/// Local required-field check failed; the network is never contacted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} required field(s) empty", .missing.len())]
pub struct ValidationError {
    pub missing: Vec<FieldId>,
}

/// How a submission ended, already classified by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Verified(VerificationResult),
    QuotaExceeded(QuotaNotice),
    Rejected { error: Option<String> },
    TransportFailed { message: String },
    AuthExpired { redirect: String },
}

/// Content of the results panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsPanel {
    #[default]
    Placeholder,
    Verified(VerificationResult),
    QuotaExceeded(QuotaNotice),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting {
        token: RequestToken,
        request: VerificationRequest,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionController {
    phase: SubmitPhase,
    panel: ResultsPanel,
}

/// Marks every empty required field invalid and clears stale feedback on the
/// ones that now pass.
pub fn validate_required(fields: &mut FieldTracker) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    for id in REQUIRED_FIELDS {
        if fields.value(id).trim().is_empty() {
            fields.set_feedback(id, Feedback::Invalid(strings::FIELD_REQUIRED.to_string()));
            missing.push(id);
        } else {
            fields.set_feedback(id, Feedback::None);
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

impl SubmissionController {
    pub fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    pub fn panel(&self) -> &ResultsPanel {
        &self.panel
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, SubmitPhase::Submitting { .. })
    }

    pub fn begin(&mut self, token: RequestToken, request: VerificationRequest) {
        self.phase = SubmitPhase::Submitting { token, request };
    }

    /// Leaves the submitting state for the matching token, whatever the
    /// outcome. Returns the request that was sent, or `None` for a stale token.
    pub fn finish(&mut self, token: RequestToken) -> Option<VerificationRequest> {
        match std::mem::take(&mut self.phase) {
            SubmitPhase::Submitting {
                token: current,
                request,
            } if current == token => Some(request),
            other => {
                self.phase = other;
                None
            }
        }
    }

    pub fn show(&mut self, panel: ResultsPanel) {
        self.panel = panel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_ignores_foreign_tokens() {
        let mut controller = SubmissionController::default();
        controller.begin(4, VerificationRequest::new(Vec::new()));
        assert_eq!(controller.finish(3), None);
        assert!(controller.is_submitting());
        assert!(controller.finish(4).is_some());
        assert!(!controller.is_submitting());
    }

    #[test]
    fn validation_error_reports_count() {
        let err = ValidationError {
            missing: vec![FieldId::CompanyVat, FieldId::CompanyName],
        };
        assert_eq!(err.to_string(), "2 required field(s) empty");
    }
}
