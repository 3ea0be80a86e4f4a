use verifier_core::{
    strings, AppViewModel, Detail, Feedback, FieldId, HistoryLog, LookupFeedback, MessageLevel,
    QuotaView, ResultsPanelView, ResultsView, ServiceSection, Tone,
};

const RULE: &str = "────────────────────────────────────────";

pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![RULE.to_string()];
    for field in &view.fields {
        let mut line = format!("{:<22} {}", field.id.name(), field.value);
        if field.highlighted {
            line.push_str("  ✨ automatisch ausgefüllt");
        } else if field.autofilled {
            line.push_str("  (automatisch)");
        }
        if view.focused == Some(field.id) {
            line.insert_str(0, "> ");
        } else {
            line.insert_str(0, "  ");
        }
        lines.push(line);
        match &field.feedback {
            Feedback::None => {}
            Feedback::Valid if field.id == FieldId::CounterpartyVat => {
                lines.push("    ✓ Format gültig".to_string());
            }
            Feedback::Valid => {}
            Feedback::Invalid(message) => lines.push(format!("    ✗ {message}")),
        }
        if field.id == FieldId::CounterpartyVat {
            lines.extend(render_lookup(view.lookup.as_ref()));
        }
    }

    lines.push(RULE.to_string());
    let marker = if view.submit_enabled { "▶" } else { "⏳" };
    lines.push(format!("[{marker} {}]", view.submit_label));
    if view.loading {
        lines.push(strings::PROCESSING.to_string());
    } else {
        lines.extend(render_results(&view.results));
    }
    lines
}

fn render_lookup(feedback: Option<&LookupFeedback>) -> Vec<String> {
    match feedback {
        None => Vec::new(),
        Some(LookupFeedback::Searching) => vec![format!("    … {}", strings::SEARCHING)],
        Some(LookupFeedback::Messages(messages)) => messages
            .iter()
            .map(|message| {
                let icon = match message.level {
                    MessageLevel::Success => "✓",
                    MessageLevel::Info => "ℹ",
                    MessageLevel::Warning => "⚠",
                    MessageLevel::Danger => "✗",
                };
                format!("    {icon} {}", message.text)
            })
            .collect(),
    }
}

fn render_results(panel: &ResultsPanelView) -> Vec<String> {
    match panel {
        ResultsPanelView::Placeholder(text) => vec![text.to_string()],
        ResultsPanelView::Error(message) => vec![format!("✗ {message}")],
        ResultsPanelView::QuotaExceeded(quota) => render_quota(quota),
        ResultsPanelView::Verified(results) => render_verified(results),
    }
}

fn render_verified(results: &ResultsView) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", strings::OVERALL_RESULT, results.overall.label),
        format!(
            "Konfidenz: {}% {}",
            results.confidence_percent,
            tone_mark(results.confidence_tone)
        ),
    ];
    if !results.check_id.is_empty() {
        lines.push(format!("{}: {}", strings::CHECK_ID, results.check_id));
    }
    for section in &results.services {
        lines.extend(render_section(section));
    }
    lines
}

fn render_section(section: &ServiceSection) -> Vec<String> {
    let fold = if section.expanded { "▼" } else { "▶" };
    let mut lines = vec![format!(
        "{fold} {} [{}] {}%",
        section.title, section.badge.label, section.confidence_percent
    )];
    if let Some(error) = &section.error_message {
        lines.push(format!("    ✗ {error}"));
    }
    for detail in &section.details {
        match detail {
            Detail::Heading(text) => lines.push(format!("    {text}")),
            Detail::Field { label, value } => lines.push(format!("      {label}: {value}")),
            Detail::Alert { tone, text } => {
                lines.push(format!("      {} {text}", tone_mark(*tone)))
            }
            Detail::Link { label, url } => lines.push(format!("      {label}: <{url}>")),
            Detail::Note(text) => lines.push(format!("      · {text}")),
            Detail::Raw(raw) => lines.extend(raw.lines().map(|line| format!("      {line}"))),
        }
    }
    if let Some(ms) = section.response_time_ms {
        lines.push(format!("    {} {ms}ms", strings::RESPONSE_TIME));
    }
    lines
}

fn render_quota(quota: &QuotaView) -> Vec<String> {
    let mut lines = vec![
        format!("⚠ {}", quota.heading),
        quota.message.clone(),
        format!("Verbrauch: {}", quota.usage_label),
        quota.upgrade_hint.to_string(),
    ];
    lines.extend(
        quota
            .actions
            .iter()
            .map(|(label, url)| format!("  → {label}: {url}")),
    );
    lines
}

fn tone_mark(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "●",
        Tone::Warning => "◐",
        Tone::Danger => "○",
        Tone::Neutral => "·",
    }
}

pub fn render_history(log: &HistoryLog) -> Vec<String> {
    if log.is_empty() {
        return vec!["Noch keine Prüfungen.".to_string()];
    }
    log.entries()
        .iter()
        .map(|entry| {
            format!(
                "{}  {} → {} ({})  {:?}  {}%  #{}",
                entry.timestamp,
                entry.company_name,
                entry.counterparty_name,
                entry.counterparty_country,
                entry.overall_status,
                (entry.confidence_score * 100.0).round() as i64,
                entry.check_id
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use verifier_core::{update, AppState, HistoryDraft, Msg, OverallStatus, SubmitOutcome};

    fn contains(lines: &[String], needle: &str) -> bool {
        lines.iter().any(|line| line.contains(needle))
    }

    #[test]
    fn fresh_form_shows_placeholder_and_idle_button() {
        let lines = render(&AppState::new().view());
        assert!(contains(&lines, strings::FILL_FORM));
        assert!(contains(&lines, "[▶ Prüfung starten]"));
        assert!(contains(&lines, "counterparty_country"));
    }

    #[test]
    fn required_errors_and_loading() {
        let (state, _) = update(AppState::new(), Msg::SubmitClicked);
        let lines = render(&state.view());
        assert!(contains(&lines, "✗ Dieses Feld ist erforderlich"));
        assert!(!contains(&lines, strings::PROCESSING));
    }

    #[test]
    fn quota_panel_lists_upgrade_links() {
        let values = [
            (FieldId::CompanyVat, "DE811111111"),
            (FieldId::CompanyName, "Muster AG"),
            (FieldId::CompanyAddress, "Marktplatz 1"),
            (FieldId::CounterpartyName, "Acme GmbH"),
            (FieldId::CounterpartyCountry, "DE"),
        ];
        let (state, _) = update(
            AppState::new(),
            Msg::FormAttached(values.iter().map(|(f, v)| (*f, v.to_string())).collect()),
        );
        let (state, _) = update(state, Msg::SubmitClicked);
        assert!(contains(&render(&state.view()), strings::PROCESSING));

        let (state, _) = update(
            state,
            Msg::SubmitCompleted {
                token: 1,
                outcome: SubmitOutcome::QuotaExceeded(Default::default()),
            },
        );
        let lines = render(&state.view());
        assert!(contains(&lines, "Verbrauch: 0 / 5"));
        assert!(contains(&lines, "/payments"));
        assert!(contains(&lines, "/dashboard"));
    }

    #[test]
    fn history_lines_are_newest_first() {
        let mut log = HistoryLog::default();
        for id in ["1", "2"] {
            log.push(
                HistoryDraft {
                    company_name: "Muster AG".to_string(),
                    counterparty_name: "Acme GmbH".to_string(),
                    counterparty_country: "DE".to_string(),
                    overall_status: OverallStatus::Valid,
                    confidence_score: 0.9,
                    check_id: id.to_string(),
                }
                .stamp("2026-02-01T09:00:00+01:00"),
            );
        }
        let lines = render_history(&log);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("#2"));
        assert!(lines[0].contains("90%"));
    }
}
