use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use verifier_core::{HistoryDraft, OverallStatus, HISTORY_LIMIT};
use verifier_engine::{Clock, HistoryError, HistoryStore, HISTORY_FILE};

fn counting_clock() -> Clock {
    let ticks = Arc::new(AtomicUsize::new(0));
    Arc::new(move || {
        let n = ticks.fetch_add(1, Ordering::SeqCst);
        format!("2026-03-01T12:{n:02}:00+01:00")
    })
}

fn draft(check_id: &str) -> HistoryDraft {
    HistoryDraft {
        company_name: "Muster AG".to_string(),
        counterparty_name: "Acme GmbH".to_string(),
        counterparty_country: "DE".to_string(),
        overall_status: OverallStatus::Warning,
        confidence_score: 0.7,
        check_id: check_id.to_string(),
    }
}

#[test]
fn missing_file_is_empty_history() {
    let temp = TempDir::new().unwrap();
    let store = HistoryStore::new(temp.path().join("state"), counting_clock());
    assert!(store.try_load().unwrap().is_empty());
}

#[test]
fn records_newest_first_and_caps() {
    let temp = TempDir::new().unwrap();
    let store = HistoryStore::new(temp.path().join("state"), counting_clock());

    for n in 0..12 {
        store.record(draft(&n.to_string()));
    }

    let log = store.try_load().unwrap();
    assert_eq!(log.len(), HISTORY_LIMIT);
    assert_eq!(log.entries()[0].check_id, "11");
    assert_eq!(log.entries()[0].timestamp, "2026-03-01T12:11:00+01:00");
    assert_eq!(log.entries()[HISTORY_LIMIT - 1].check_id, "2");

    let raw = fs::read_to_string(temp.path().join("state").join(HISTORY_FILE)).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored[0]["counterparty_name"], "Acme GmbH");
    assert_eq!(stored[0]["overall_status"], "warning");
}

#[test]
fn corrupt_file_is_reported_then_replaced() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(HISTORY_FILE), "{not json").unwrap();
    let store = HistoryStore::new(temp.path().to_path_buf(), counting_clock());

    assert!(matches!(store.try_load(), Err(HistoryError::Corrupt(_))));
    assert!(store.load().is_empty());

    let log = store.try_record(draft("1")).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(store.try_load().unwrap().entries()[0].check_id, "1");
}

#[test]
fn unwritable_location_is_swallowed() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();
    let store = HistoryStore::new(blocker.clone(), counting_clock());

    assert!(matches!(
        store.try_record(draft("1")),
        Err(HistoryError::StorageDir(_))
    ));
    store.record(draft("2"));
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}
