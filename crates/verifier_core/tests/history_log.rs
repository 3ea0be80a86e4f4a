use pretty_assertions::assert_eq;
use verifier_core::{HistoryDraft, HistoryEntry, HistoryLog, OverallStatus, HISTORY_LIMIT};

fn entry(n: usize) -> HistoryEntry {
    HistoryDraft {
        company_name: "Muster AG".to_string(),
        counterparty_name: format!("Partner {n}"),
        counterparty_country: "DE".to_string(),
        overall_status: OverallStatus::Valid,
        confidence_score: 0.9,
        check_id: n.to_string(),
    }
    .stamp(format!("2026-01-{:02}T10:00:00+00:00", n + 1))
}

#[test]
fn newest_entry_first_and_capped() {
    let mut log = HistoryLog::default();
    for n in 0..12 {
        log.push(entry(n));
    }

    assert_eq!(log.len(), HISTORY_LIMIT);
    assert_eq!(log.entries()[0].check_id, "11");
    assert_eq!(log.entries()[HISTORY_LIMIT - 1].check_id, "2");
}

#[test]
fn oversized_stored_log_is_trimmed() {
    let entries: Vec<HistoryEntry> = (0..15).map(entry).collect();
    let log = HistoryLog::from_entries(entries);
    assert_eq!(log.len(), HISTORY_LIMIT);
    assert_eq!(log.entries()[0].check_id, "0");
}

#[test]
fn stored_entries_tolerate_numeric_ids_and_missing_fields() {
    let parsed: HistoryEntry = serde_json::from_str(
        r#"{"timestamp": "2026-01-01T00:00:00Z", "check_id": 42, "overall_status": "error"}"#,
    )
    .expect("entry parses");
    assert_eq!(parsed.check_id, "42");
    assert_eq!(parsed.overall_status, OverallStatus::Error);
    assert_eq!(parsed.company_name, "");
}
