use crate::results::{QuotaView, ResultsView};
use crate::{Feedback, FieldId, LookupFeedback};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub id: FieldId,
    pub value: String,
    pub autofilled: bool,
    pub highlighted: bool,
    pub feedback: Feedback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsPanelView {
    Placeholder(&'static str),
    Verified(ResultsView),
    QuotaExceeded(QuotaView),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub fields: Vec<FieldView>,
    pub focused: Option<FieldId>,
    pub lookup: Option<LookupFeedback>,
    pub loading: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub results: ResultsPanelView,
}

impl AppViewModel {
    pub fn field(&self, id: FieldId) -> Option<&FieldView> {
        self.fields.iter().find(|field| field.id == id)
    }
}
