use verifier_logging::{verifier_debug, verifier_info, verifier_warn};

use crate::field::{Feedback, FieldId, FieldKind, FieldTracker};
use crate::history::HistoryDraft;
use crate::lookup::{
    CommitDecision, LookupMessage, LookupOutcome, LookupPayload, MessageLevel,
};
use crate::strings;
use crate::submission::{validate_required, ResultsPanel, SubmitOutcome};
use crate::vat_format::{check_vat_format, format_hint, FormatCheck};
use crate::verification::VerificationRequest;
use crate::{AppState, Effect, Msg, RequestToken, AUTOFILL_HIGHLIGHT, LOOKUP_DEBOUNCE};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();
    match msg {
        Msg::FormAttached(values) => {
            if state.attached {
                verifier_warn!("form attached twice; keeping current edit state");
            } else {
                state.fields = FieldTracker::attach(values);
                state.attached = true;
                state.mark_dirty();
            }
        }
        Msg::FieldInput { field, value } => {
            if state.fields.store(field, value) {
                notify_change(&mut state, field, &mut effects);
            }
        }
        Msg::FieldCommitted(field) => {
            if state.focused == Some(field) {
                state.focused = None;
                state.mark_dirty();
            }
            match field {
                FieldId::CounterpartyVat => commit_vat(&mut state, &mut effects),
                FieldId::CounterpartyDomain => {
                    let formatted = normalize_domain(state.fields.value(field));
                    if state.fields.store(field, formatted) {
                        state.mark_dirty();
                    }
                }
                _ => {}
            }
        }
        Msg::LookupDebounceElapsed { token } => {
            if let Some(query) = state.lookup.debounce_elapsed(token) {
                verifier_info!("looking up VAT {} (request {token})", query.vat_number);
                effects.push(Effect::StartLookup { token, query });
                state.mark_dirty();
            } else {
                verifier_debug!("debounce {token} superseded");
            }
        }
        Msg::LookupCompleted { token, outcome } => {
            lookup_completed(&mut state, token, outcome, &mut effects);
        }
        Msg::HighlightExpired { field, token } => {
            if state.fields.expire_highlight(field, token) {
                state.mark_dirty();
            }
        }
        Msg::SubmitClicked => submit(&mut state, &mut effects),
        Msg::SubmitCompleted { token, outcome } => {
            submit_completed(&mut state, token, outcome, &mut effects);
        }
    }

    (state, effects)
}

/// Appends `.com` to a bare name and strips a leading `www.` unless the input
/// is a URL.
pub fn normalize_domain(raw: &str) -> String {
    let domain = raw.trim();
    if domain.is_empty() {
        return String::new();
    }
    let mut domain = if domain.contains('.') {
        domain.to_string()
    } else {
        format!("{domain}.com")
    };
    if !domain.starts_with("http") && !domain.starts_with("//") {
        if let Some(rest) = domain.strip_prefix("www.") {
            domain = rest.to_string();
        }
    }
    domain
}

/// Change listener shared by user input and synthesized notifications. The
/// field's applying flag tells the two apart.
fn notify_change(state: &mut AppState, field: FieldId, effects: &mut Vec<Effect>) {
    let programmatic = state.fields.is_applying(field);
    if !programmatic {
        state.fields.mark_manual_edit(field);
        state.focused = Some(field);
    }
    match field {
        FieldId::CounterpartyVat if programmatic => {
            state.fields.set_feedback(field, Feedback::None);
        }
        FieldId::CounterpartyVat => refresh_vat_feedback(&mut state.fields),
        FieldId::CounterpartyCountry => {
            if *state.fields.field(FieldId::CounterpartyVat).feedback() != Feedback::None {
                refresh_vat_feedback(&mut state.fields);
            }
            if !programmatic {
                state.lookup.forget_applied();
                assist_country_prefix(state, effects);
            }
        }
        _ => {}
    }
    state.mark_dirty();
}

/// Seeds the VAT input with the chosen country code when it is empty or
/// carries another prefix.
fn assist_country_prefix(state: &mut AppState, effects: &mut Vec<Effect>) {
    let country = state.fields.value(FieldId::CounterpartyCountry).trim().to_uppercase();
    if country.is_empty() {
        return;
    }
    let vat = state.fields.value(FieldId::CounterpartyVat).trim().to_uppercase();
    if !vat.is_empty() && vat.starts_with(&country) {
        return;
    }

    verifier_debug!("seeding VAT prefix {country}");
    state.fields.begin_apply(FieldId::CounterpartyVat);
    if state.fields.store(FieldId::CounterpartyVat, country) {
        notify_change(state, FieldId::CounterpartyVat, effects);
    }
    state.fields.end_apply(FieldId::CounterpartyVat);
    state.focused = Some(FieldId::CounterpartyVat);
    effects.push(Effect::FocusField(FieldId::CounterpartyVat));
}

fn refresh_vat_feedback(fields: &mut FieldTracker) {
    let vat = fields.value(FieldId::CounterpartyVat);
    let country = fields.value(FieldId::CounterpartyCountry);
    let feedback = if vat.trim().is_empty() {
        Feedback::None
    } else {
        match check_vat_format(country, vat) {
            FormatCheck::Invalid => Feedback::Invalid(strings::invalid_vat_format(
                country.trim(),
                format_hint(country),
            )),
            FormatCheck::Valid | FormatCheck::Unchecked => Feedback::Valid,
        }
    };
    fields.set_feedback(FieldId::CounterpartyVat, feedback);
}

fn commit_vat(state: &mut AppState, effects: &mut Vec<Effect>) {
    let AppState {
        fields,
        lookup,
        last_token,
        ..
    } = state;
    let decision = lookup.commit(
        fields.value(FieldId::CounterpartyVat),
        fields.value(FieldId::CounterpartyCountry),
        || {
            *last_token += 1;
            *last_token
        },
    );

    match decision {
        CommitDecision::TooShort { cancelled } => {
            push_cancel(effects, cancelled);
            state.mark_dirty();
        }
        CommitDecision::AlreadyApplied { cancelled } => {
            verifier_debug!("VAT unchanged since last lookup; not fetching again");
            push_cancel(effects, cancelled);
            state.mark_dirty();
        }
        CommitDecision::AlreadyPending => {
            verifier_debug!("identical VAT lookup already pending");
        }
        CommitDecision::Scheduled { token, cancelled } => {
            push_cancel(effects, cancelled);
            effects.push(Effect::ScheduleLookup {
                token,
                after: LOOKUP_DEBOUNCE,
            });
            state.mark_dirty();
        }
    }
}

fn push_cancel(effects: &mut Vec<Effect>, cancelled: Option<RequestToken>) {
    if let Some(token) = cancelled {
        verifier_debug!("cancelling superseded lookup {token}");
        effects.push(Effect::CancelLookup { token });
    }
}

fn lookup_completed(
    state: &mut AppState,
    token: RequestToken,
    outcome: LookupOutcome,
    effects: &mut Vec<Effect>,
) {
    let Some(query) = state.lookup.resolve(token) else {
        verifier_debug!("dropping stale lookup response {token}");
        return;
    };
    state.mark_dirty();

    match outcome {
        LookupOutcome::Prefilled(LookupPayload { prefill, messages }) => {
            for (field, value) in prefill.entries() {
                apply_autofill(state, field, value, effects);
            }
            state.lookup.record_applied(query.vat_number, messages);
        }
        LookupOutcome::Rejected { error, mut messages } => {
            verifier_info!("lookup for {} rejected", query.vat_number);
            if let Some(error) = error.filter(|e| !e.trim().is_empty()) {
                if !messages.iter().any(|m| m.text == error) {
                    messages.push(LookupMessage::new(MessageLevel::Danger, error));
                }
            }
            if messages.is_empty() {
                messages.push(LookupMessage::new(MessageLevel::Danger, strings::LOOKUP_FAILED));
            }
            state.lookup.record_failure(messages);
        }
        LookupOutcome::TransportFailed { message } => {
            verifier_warn!("lookup for {} failed: {message}", query.vat_number);
            state.lookup.record_failure(vec![LookupMessage::new(
                MessageLevel::Danger,
                format!("{}: {message}", strings::LOOKUP_FAILED),
            )]);
        }
        LookupOutcome::AuthExpired { redirect } => {
            state.lookup.clear_feedback();
            effects.push(Effect::Navigate { target: redirect });
        }
        LookupOutcome::Cancelled => {
            state.lookup.clear_feedback();
        }
    }
}

fn apply_autofill(state: &mut AppState, field: FieldId, value: &str, effects: &mut Vec<Effect>) {
    if !state.fields.accepts_autofill(field) {
        verifier_debug!("keeping user value in {}", field.name());
        return;
    }
    let token = state.next_token();
    state.fields.begin_apply(field);
    state.fields.write_autofill(field, value, token);
    if field.kind() == FieldKind::Select {
        notify_change(state, field, effects);
    }
    state.fields.end_apply(field);
    effects.push(Effect::ScheduleHighlightClear {
        field,
        token,
        after: AUTOFILL_HIGHLIGHT,
    });
}

fn submit(state: &mut AppState, effects: &mut Vec<Effect>) {
    if state.submission.is_submitting() {
        verifier_debug!("submit ignored while a verification is running");
        return;
    }
    let valid = validate_required(&mut state.fields);
    state.mark_dirty();
    if let Err(err) = valid {
        verifier_info!("submission blocked: {err}");
        return;
    }

    let token = state.next_token();
    let request = VerificationRequest::new(state.fields.snapshot());
    verifier_info!("submitting verification {token}");
    state.submission.begin(token, request.clone());
    effects.push(Effect::SubmitVerification { token, request });
}

fn submit_completed(
    state: &mut AppState,
    token: RequestToken,
    outcome: SubmitOutcome,
    effects: &mut Vec<Effect>,
) {
    let Some(request) = state.submission.finish(token) else {
        verifier_warn!("ignoring completion of unknown submission {token}");
        return;
    };
    state.mark_dirty();

    match outcome {
        SubmitOutcome::Verified(result) => {
            effects.push(Effect::RecordHistory(HistoryDraft::from_submission(
                &request, &result,
            )));
            state.submission.show(ResultsPanel::Verified(result));
        }
        SubmitOutcome::QuotaExceeded(notice) => {
            state.submission.show(ResultsPanel::QuotaExceeded(notice));
        }
        SubmitOutcome::Rejected { error } => {
            let message = error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| strings::UNKNOWN_ERROR.to_string());
            state.submission.show(ResultsPanel::Failed(message));
        }
        SubmitOutcome::TransportFailed { message } => {
            state
                .submission
                .show(ResultsPanel::Failed(strings::connection_error(&message)));
        }
        SubmitOutcome::AuthExpired { redirect } => {
            effects.push(Effect::Navigate { target: redirect });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_domain;

    #[test]
    fn domain_gets_tld_and_loses_www() {
        assert_eq!(normalize_domain("acme"), "acme.com");
        assert_eq!(normalize_domain(" www.acme.de "), "acme.de");
        assert_eq!(normalize_domain("https://www.acme.de"), "https://www.acme.de");
        assert_eq!(normalize_domain("//www.acme.de"), "//www.acme.de");
        assert_eq!(normalize_domain("   "), "");
    }
}
