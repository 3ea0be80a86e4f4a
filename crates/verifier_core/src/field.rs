use verifier_logging::verifier_trace;

/// Every input of the verification form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    CompanyVat,
    CompanyName,
    CompanyAddress,
    CompanyEmail,
    CompanyPhone,
    CounterpartyVat,
    CounterpartyName,
    CounterpartyAddress,
    CounterpartyEmail,
    CounterpartyDomain,
    CounterpartyContact,
    CounterpartyCountry,
}

pub const ALL_FIELDS: [FieldId; 12] = [
    FieldId::CompanyVat,
    FieldId::CompanyName,
    FieldId::CompanyAddress,
    FieldId::CompanyEmail,
    FieldId::CompanyPhone,
    FieldId::CounterpartyVat,
    FieldId::CounterpartyName,
    FieldId::CounterpartyAddress,
    FieldId::CounterpartyEmail,
    FieldId::CounterpartyDomain,
    FieldId::CounterpartyContact,
    FieldId::CounterpartyCountry,
];

/// Fields that must be non-empty before a submission may reach the network.
pub const REQUIRED_FIELDS: [FieldId; 5] = [
    FieldId::CompanyVat,
    FieldId::CompanyName,
    FieldId::CompanyAddress,
    FieldId::CounterpartyName,
    FieldId::CounterpartyCountry,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Select,
}

impl FieldId {
    /// Wire name used by both endpoints and the persisted config.
    pub fn name(self) -> &'static str {
        match self {
            FieldId::CompanyVat => "company_vat",
            FieldId::CompanyName => "company_name",
            FieldId::CompanyAddress => "company_address",
            FieldId::CompanyEmail => "company_email",
            FieldId::CompanyPhone => "company_phone",
            FieldId::CounterpartyVat => "counterparty_vat",
            FieldId::CounterpartyName => "counterparty_name",
            FieldId::CounterpartyAddress => "counterparty_address",
            FieldId::CounterpartyEmail => "counterparty_email",
            FieldId::CounterpartyDomain => "counterparty_domain",
            FieldId::CounterpartyContact => "counterparty_contact",
            FieldId::CounterpartyCountry => "counterparty_country",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_FIELDS.into_iter().find(|id| id.name() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::CounterpartyCountry => FieldKind::Select,
            _ => FieldKind::Text,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Validation marker shown next to a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Feedback {
    #[default]
    None,
    Valid,
    Invalid(String),
}

/// Per-field value plus the metadata that arbitrates every later write.
///
/// `autofilled` and `user_edited` are never both set; every mutator below
/// keeps that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormField {
    value: String,
    autofilled: bool,
    user_edited: bool,
    applying: bool,
    highlight: Option<u64>,
    feedback: Feedback,
}

impl FormField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_autofilled(&self) -> bool {
        self.autofilled
    }

    pub fn is_user_edited(&self) -> bool {
        self.user_edited
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight.is_some()
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    fn has_user_content(&self) -> bool {
        self.user_edited && !self.value.trim().is_empty()
    }
}

/// Field State Tracker: owns all form fields and the write arbitration rules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldTracker {
    fields: [FormField; 12],
}

impl FieldTracker {
    /// Derives the initial edit state once from pre-existing values: a field
    /// that arrives non-empty counts as user-edited.
    pub fn attach<I, S>(initial: I) -> Self
    where
        I: IntoIterator<Item = (FieldId, S)>,
        S: Into<String>,
    {
        let mut tracker = Self::default();
        for (id, value) in initial {
            let value = value.into();
            let field = &mut tracker.fields[id.index()];
            field.user_edited = !value.trim().is_empty();
            field.value = value;
        }
        tracker
    }

    pub fn field(&self, id: FieldId) -> &FormField {
        &self.fields[id.index()]
    }

    pub fn value(&self, id: FieldId) -> &str {
        &self.fields[id.index()].value
    }

    /// Stores a raw value without touching the edit flags. Returns whether the
    /// value actually changed.
    pub fn store(&mut self, id: FieldId, value: impl Into<String>) -> bool {
        let value = value.into();
        let field = &mut self.fields[id.index()];
        if field.value == value {
            return false;
        }
        field.value = value;
        true
    }

    /// Records a user-originated edit. Clears the autofill marker and any
    /// pending highlight on the field; a field's label group shares its
    /// marker, other fields keep theirs.
    pub fn mark_manual_edit(&mut self, id: FieldId) {
        let field = &mut self.fields[id.index()];
        field.user_edited = true;
        field.autofilled = false;
        field.highlight = None;
    }

    pub fn is_applying(&self, id: FieldId) -> bool {
        self.fields[id.index()].applying
    }

    /// Opens a programmatic write window on `id`. Change notifications raised
    /// while it is open must not be treated as user edits.
    pub fn begin_apply(&mut self, id: FieldId) {
        self.fields[id.index()].applying = true;
    }

    pub fn end_apply(&mut self, id: FieldId) {
        self.fields[id.index()].applying = false;
    }

    /// Autofill-write rule: a field holding a non-empty value the user typed
    /// is never overwritten.
    pub fn accepts_autofill(&self, id: FieldId) -> bool {
        !self.fields[id.index()].has_user_content()
    }

    /// Writes an autofilled value and tags it with a highlight token. Callers
    /// must check [`FieldTracker::accepts_autofill`] first.
    pub fn write_autofill(&mut self, id: FieldId, value: impl Into<String>, highlight: u64) {
        let field = &mut self.fields[id.index()];
        field.value = value.into();
        field.autofilled = true;
        field.user_edited = false;
        field.highlight = Some(highlight);
        verifier_trace!("autofilled {} (highlight {})", id.name(), highlight);
    }

    /// Clears the highlight only if `token` is the one currently shown.
    pub fn expire_highlight(&mut self, id: FieldId, token: u64) -> bool {
        let field = &mut self.fields[id.index()];
        if field.highlight == Some(token) {
            field.highlight = None;
            true
        } else {
            false
        }
    }

    pub fn set_feedback(&mut self, id: FieldId, feedback: Feedback) -> bool {
        let field = &mut self.fields[id.index()];
        if field.feedback == feedback {
            return false;
        }
        field.feedback = feedback;
        true
    }

    /// Values of every field in form order.
    pub fn snapshot(&self) -> Vec<(FieldId, String)> {
        ALL_FIELDS
            .iter()
            .map(|id| (*id, self.value(*id).to_string()))
            .collect()
    }
}
