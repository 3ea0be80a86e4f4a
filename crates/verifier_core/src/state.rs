use crate::field::{FieldId, FieldTracker, ALL_FIELDS};
use crate::lookup::LookupCoordinator;
use crate::results::{build_quota_view, build_results_view};
use crate::strings;
use crate::submission::{ResultsPanel, SubmissionController};
use crate::view_model::{AppViewModel, FieldView, ResultsPanelView};
use crate::RequestToken;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) attached: bool,
    pub(crate) fields: FieldTracker,
    pub(crate) lookup: LookupCoordinator,
    pub(crate) submission: SubmissionController,
    pub(crate) focused: Option<FieldId>,
    pub(crate) last_token: RequestToken,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &FieldTracker {
        &self.fields
    }

    pub fn lookup(&self) -> &LookupCoordinator {
        &self.lookup
    }

    pub fn submission(&self) -> &SubmissionController {
        &self.submission
    }

    pub fn view(&self) -> AppViewModel {
        let submitting = self.submission.is_submitting();
        AppViewModel {
            fields: ALL_FIELDS
                .iter()
                .map(|id| {
                    let field = self.fields.field(*id);
                    FieldView {
                        id: *id,
                        value: field.value().to_string(),
                        autofilled: field.is_autofilled(),
                        highlighted: field.is_highlighted(),
                        feedback: field.feedback().clone(),
                    }
                })
                .collect(),
            focused: self.focused,
            lookup: self.lookup.feedback().cloned(),
            loading: submitting,
            submit_enabled: !submitting,
            submit_label: if submitting {
                strings::SUBMIT_BUSY
            } else {
                strings::SUBMIT_IDLE
            },
            results: match self.submission.panel() {
                ResultsPanel::Placeholder => ResultsPanelView::Placeholder(strings::FILL_FORM),
                ResultsPanel::Verified(result) => {
                    ResultsPanelView::Verified(build_results_view(result))
                }
                ResultsPanel::QuotaExceeded(notice) => {
                    ResultsPanelView::QuotaExceeded(build_quota_view(notice))
                }
                ResultsPanel::Failed(message) => ResultsPanelView::Error(message.clone()),
            },
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn next_token(&mut self) -> RequestToken {
        self.last_token += 1;
        self.last_token
    }
}
