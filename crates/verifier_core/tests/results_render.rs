use pretty_assertions::assert_eq;
use serde_json::json;
use verifier_core::{
    build_quota_view, build_results_view, Detail, QuotaLimit, QuotaNotice, Tone,
    VerificationResult,
};

fn parse(body: serde_json::Value) -> VerificationResult {
    serde_json::from_value(body).expect("valid result body")
}

#[test]
fn sections_follow_server_order_and_first_is_expanded() {
    let result = parse(json!({
        "overall_status": "warning",
        "confidence_score": 0.65,
        "check_id": 12,
        "results": {
            "sanctions": {"status": "ok", "confidence": 1.0, "data": {"matches": []}},
            "vies": {"status": "valid", "confidence": 0.9, "response_time_ms": 412.4},
            "handelsregister": {"status": "error", "error_message": "Zeitüberschreitung"}
        }
    }));
    let view = build_results_view(&result);

    assert_eq!(view.overall.tone, Tone::Warning);
    assert_eq!(view.confidence_percent, 65);
    assert_eq!(view.confidence_tone, Tone::Warning);
    assert_eq!(view.check_id, "12");
    let ids: Vec<&str> = view.services.iter().map(|s| s.service_id.as_str()).collect();
    assert_eq!(ids, vec!["sanctions", "vies", "handelsregister"]);
    assert!(view.services[0].expanded);
    assert!(!view.services[1].expanded);
    assert_eq!(view.services[1].title, "VIES USt-IdNr. Prüfung");
    assert_eq!(view.services[1].response_time_ms, Some(412));
    assert_eq!(
        view.services[2].error_message.as_deref(),
        Some("Zeitüberschreitung")
    );
    assert!(view.services[0].details.contains(&Detail::Alert {
        tone: Tone::Success,
        text: "✅ Keine Treffer in Sanktionslisten".to_string(),
    }));
}

#[test]
fn confidence_thresholds() {
    for (score, tone) in [(0.8, Tone::Success), (0.6, Tone::Warning), (0.59, Tone::Danger)] {
        let view = build_results_view(&parse(json!({"confidence_score": score})));
        assert_eq!(view.confidence_tone, tone, "score {score}");
    }
}

#[test]
fn vies_details_are_labelled() {
    let result = parse(json!({
        "results": {
            "vies": {"status": "valid", "data": {
                "valid": true,
                "country_code": "DE",
                "vat_number": "123456789",
                "company_name": "Acme GmbH",
                "company_address": "Hauptstr. 1\n10115 Berlin"
            }}
        }
    }));
    let details = &build_results_view(&result).services[0].details;
    assert!(details.contains(&Detail::Field {
        label: "USt-IdNr.".to_string(),
        value: "DE123456789".to_string(),
    }));
    assert!(details.contains(&Detail::Field {
        label: "Adresse".to_string(),
        value: "Hauptstr. 1, 10115 Berlin".to_string(),
    }));
}

#[test]
fn osint_notes_suppress_raw_dump() {
    let result = parse(json!({
        "results": {
            "robots": {"status": "ok", "data": {"status": "ok", "notes": "robots.txt nicht gefunden"}}
        }
    }));
    let details = &build_results_view(&result).services[0].details;
    assert!(details.contains(&Detail::Note("robots.txt nicht gefunden".to_string())));
    assert!(!details.iter().any(|d| matches!(d, Detail::Raw(_))));
}

#[test]
fn osint_without_known_fields_falls_back_to_raw() {
    let result = parse(json!({
        "results": {
            "whois": {"status": "warn", "data": {"status": "warn", "raw_text": "n/a"}}
        }
    }));
    let details = &build_results_view(&result).services[0].details;
    assert!(details.contains(&Detail::Alert {
        tone: Tone::Warning,
        text: "Unvollständige Daten".to_string(),
    }));
    assert!(matches!(details.last(), Some(Detail::Raw(raw)) if raw.contains("raw_text")));
}

#[test]
fn unknown_service_shows_raw_json_and_uppercase_title() {
    let result = parse(json!({
        "results": {"lei": {"status": "success", "data": {"lei": "5299001"}}}
    }));
    let section = &build_results_view(&result).services[0];
    assert_eq!(section.title, "LEI");
    assert!(matches!(section.details.last(), Some(Detail::Raw(raw)) if raw.contains("5299001")));
}

#[test]
fn quota_view_renders_unlimited_as_infinity() {
    let view = build_quota_view(&QuotaNotice {
        plan: "Business".to_string(),
        usage: 120,
        limit: QuotaLimit::Unlimited,
    });
    assert_eq!(view.usage_label, "120 / ∞");
    assert_eq!(
        view.actions,
        vec![("Plan upgraden", "/payments"), ("Zum Dashboard", "/dashboard")]
    );
}
