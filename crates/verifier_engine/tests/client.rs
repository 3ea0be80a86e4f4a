use std::sync::Once;

use pretty_assertions::assert_eq;
use serde_json::json;
use verifier_core::{
    FieldId, LookupMessage, LookupQuery, MessageLevel, OverallStatus, QuotaLimit, QuotaNotice,
    VerificationRequest,
};
use verifier_engine::{ClientError, ClientSettings, ReqwestBackend, VerificationBackend};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(verifier_logging::initialize_for_tests);
}

fn backend_for(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("backend")
}

fn request() -> VerificationRequest {
    VerificationRequest::new(vec![
        (FieldId::CompanyName, "Muster AG".to_string()),
        (FieldId::CounterpartyName, "Acme GmbH".to_string()),
        (FieldId::CounterpartyCountry, "DE".to_string()),
    ])
}

#[tokio::test]
async fn lookup_posts_query_and_decodes_prefill() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/vat-lookup"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"vat_number": "DE123456789", "country_code": "DE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "prefill": {
                "counterparty_name": "Acme GmbH",
                "counterparty_address": "Hauptstr. 1",
                "counterparty_registration": "HRB 1234"
            },
            "messages": [{"level": "success", "text": "Daten übernommen"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = backend_for(&server)
        .lookup_vat(&LookupQuery {
            vat_number: "DE123456789".to_string(),
            country_code: Some("DE".to_string()),
        })
        .await
        .expect("lookup ok");

    assert_eq!(payload.prefill.counterparty_name.as_deref(), Some("Acme GmbH"));
    assert_eq!(payload.prefill.counterparty_vat, None);
    assert_eq!(
        payload.messages,
        vec![LookupMessage::new(MessageLevel::Success, "Daten übernommen")]
    );
}

#[tokio::test]
async fn lookup_rejection_carries_server_messages() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/vat-lookup"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "USt-IdNr. ungültig",
            "messages": [{"level": "danger", "text": "USt-IdNr. ungültig"}]
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .lookup_vat(&LookupQuery {
            vat_number: "DE000".to_string(),
            country_code: None,
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Domain {
            error: Some("USt-IdNr. ungültig".to_string()),
            messages: vec![LookupMessage::new(MessageLevel::Danger, "USt-IdNr. ungültig")],
        }
    );
}

#[tokio::test]
async fn verify_sends_form_and_decodes_result() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .and(body_json(json!({
            "company_name": "Muster AG",
            "counterparty_name": "Acme GmbH",
            "counterparty_country": "DE"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "check_id": 301,
            "overall_status": "valid",
            "confidence_score": 0.88,
            "results": {
                "vies": {"status": "valid", "confidence": 0.95},
                "sanctions": {"status": "ok", "confidence": 1.0}
            }
        })))
        .mount(&server)
        .await;

    let result = backend_for(&server).verify(&request()).await.expect("verified");
    assert_eq!(result.overall_status, OverallStatus::Valid);
    assert_eq!(result.check_id, "301");
    let services: Vec<&str> = result.results.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(services, vec!["vies", "sanctions"]);
}

#[tokio::test]
async fn verify_keeps_service_order_and_tolerates_nulls() {
    init_logging();
    let server = MockServer::start().await;
    let body = r#"{"success": true, "check_id": "a7", "overall_status": "warning",
        "confidence_score": null, "results": {
            "vies": {"status": "valid", "confidence": 0.9},
            "whois": {"status": null, "confidence": null},
            "handelsregister": {"status": "warning", "confidence": 0.5}}}"#;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let result = backend_for(&server).verify(&request()).await.expect("verified");
    let services: Vec<&str> = result.results.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(services, vec!["vies", "whois", "handelsregister"]);
    assert_eq!(result.confidence_score, 0.0);
    assert_eq!(result.results[1].1.confidence, 0.0);
}

#[tokio::test]
async fn verify_quota_rejection() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "error": "Monatliches Limit erreicht",
            "current_plan": "Free",
            "current_usage": 5,
            "limit": "unlimited",
            "upgrade_required": true
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server).verify(&request()).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::QuotaExceeded(QuotaNotice {
            plan: "Free".to_string(),
            usage: 5,
            limit: QuotaLimit::Unlimited,
        })
    );
}

#[tokio::test]
async fn expired_session_redirect_is_absolute() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": "Sitzung abgelaufen",
            "redirect": "/login"
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server).verify(&request()).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::AuthExpired {
            redirect: format!("{}/login", server.uri()),
        }
    );
}

#[tokio::test]
async fn non_json_error_page_is_http_status() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(
            ResponseTemplate::new(500).set_body_raw("<h1>Internal Server Error</h1>", "text/html"),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).verify(&request()).await.unwrap_err();
    assert_eq!(err, ClientError::HttpStatus { status: 500 });
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("x".repeat(256), "application/json"))
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(ClientSettings {
        base_url: server.uri(),
        max_bytes: 64,
        ..ClientSettings::default()
    })
    .expect("backend");
    let err = backend.verify(&request()).await.unwrap_err();
    assert_eq!(err, ClientError::TooLarge { max_bytes: 64 });
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    init_logging();
    let backend = ReqwestBackend::new(ClientSettings {
        base_url: "http://127.0.0.1:1".to_string(),
        ..ClientSettings::default()
    })
    .expect("backend");

    let err = backend.verify(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)), "got {err:?}");
}
