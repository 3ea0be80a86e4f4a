//! Turns a verification response into a display structure, one section per
//! service, in the order the server listed them.

use serde_json::{Map, Value};

use crate::strings;
use crate::verification::{
    OverallStatus, QuotaNotice, ServiceResult, ServiceStatus, VerificationResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    Heading(String),
    Field { label: String, value: String },
    Alert { tone: Tone, text: String },
    Link { label: String, url: String },
    Note(String),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSection {
    pub service_id: String,
    pub title: String,
    pub icon: &'static str,
    pub badge: StatusBadge,
    pub expanded: bool,
    pub confidence_percent: u8,
    pub details: Vec<Detail>,
    pub error_message: Option<String>,
    pub response_time_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub overall: StatusBadge,
    pub confidence_percent: u8,
    pub confidence_tone: Tone,
    pub check_id: String,
    pub services: Vec<ServiceSection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaView {
    pub heading: &'static str,
    pub message: String,
    pub usage_label: String,
    pub upgrade_hint: &'static str,
    pub actions: Vec<(&'static str, &'static str)>,
}

pub fn build_results_view(result: &VerificationResult) -> ResultsView {
    ResultsView {
        overall: overall_badge(result.overall_status),
        confidence_percent: percent(result.confidence_score),
        confidence_tone: confidence_tone(result.confidence_score),
        check_id: result.check_id.clone(),
        services: result
            .results
            .iter()
            .enumerate()
            .map(|(index, (service, outcome))| build_section(service, outcome, index == 0))
            .collect(),
    }
}

pub fn build_quota_view(notice: &QuotaNotice) -> QuotaView {
    QuotaView {
        heading: strings::QUOTA_HEADING,
        message: strings::quota_reached(&notice.plan),
        usage_label: format!("{} / {}", notice.usage, notice.limit),
        upgrade_hint: strings::QUOTA_UPGRADE_HINT,
        actions: vec![
            (strings::QUOTA_UPGRADE_LABEL, strings::QUOTA_UPGRADE_URL),
            (strings::QUOTA_DASHBOARD_LABEL, strings::QUOTA_DASHBOARD_URL),
        ],
    }
}

fn build_section(service: &str, outcome: &ServiceResult, expanded: bool) -> ServiceSection {
    let details = outcome
        .data
        .as_ref()
        .map(|data| ServiceFormat::for_service(service).render(service, data))
        .unwrap_or_default();

    ServiceSection {
        service_id: service.to_string(),
        title: service_display_name(service),
        icon: service_icon(service),
        badge: service_badge(outcome.status),
        expanded,
        confidence_percent: percent(outcome.confidence),
        details,
        error_message: outcome.error_message.clone().filter(|m| !m.is_empty()),
        response_time_ms: outcome
            .response_time_ms
            .filter(|ms| *ms > 0.0)
            .map(|ms| ms.round() as u64),
    }
}

fn percent(score: f64) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

fn confidence_tone(score: f64) -> Tone {
    if score >= 0.8 {
        Tone::Success
    } else if score >= 0.6 {
        Tone::Warning
    } else {
        Tone::Danger
    }
}

fn overall_badge(status: OverallStatus) -> StatusBadge {
    match status {
        OverallStatus::Valid => badge("✅ Gültig", Tone::Success),
        OverallStatus::Warning => badge("⚠️ Warnung", Tone::Warning),
        OverallStatus::Error => badge("❌ Problem", Tone::Danger),
        OverallStatus::Pending => badge("⏳ Ausstehend", Tone::Neutral),
    }
}

fn service_badge(status: ServiceStatus) -> StatusBadge {
    match status {
        ServiceStatus::Valid => badge("✅ Gültig", Tone::Success),
        ServiceStatus::Ok => badge("✅ OK", Tone::Neutral),
        ServiceStatus::Success => badge("✅ Erfolgreich", Tone::Neutral),
        ServiceStatus::Warning | ServiceStatus::Warn => badge("⚠️ Warnung", Tone::Warning),
        ServiceStatus::Error => badge("❌ Problem", Tone::Danger),
        ServiceStatus::Pending => badge("⏳ Ausstehend", Tone::Neutral),
    }
}

fn badge(label: &'static str, tone: Tone) -> StatusBadge {
    StatusBadge { label, tone }
}

fn service_display_name(service: &str) -> String {
    let known = match service {
        "vies" => "VIES USt-IdNr. Prüfung",
        "handelsregister" => "Handelsregister DE",
        "sanctions" => "Sanktionslisten EU/OFAC/UK",
        "insolvency" => "Insolvenzbekanntmachungen",
        "opencorporates" => "OpenCorporates",
        "whois" => "WHOIS Domain-Info",
        "dns" => "DNS Records",
        "ssllabs" => "SSL Zertifikat Analyse",
        "security_headers" => "Sicherheits-Header",
        "robots" => "Robots.txt Analyse",
        "social_links" => "Soziale Netzwerke",
        "email_basic" => "E-Mail Validierung",
        other => return other.to_uppercase(),
    };
    known.to_string()
}

fn service_icon(service: &str) -> &'static str {
    match service {
        "vies" => "bi-patch-check",
        "handelsregister" => "bi-building",
        "sanctions" => "bi-shield-exclamation",
        "insolvency" => "bi-exclamation-triangle",
        "opencorporates" => "bi-globe",
        _ => "bi-gear",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Osint {
    Whois,
    Dns,
    SslLabs,
    SecurityHeaders,
    Robots,
    SocialLinks,
    EmailBasic,
}

/// Formatter chosen by service id; unknown services get raw JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceFormat {
    Vies,
    Handelsregister,
    Sanctions,
    Osint(Osint),
    Fallback,
}

impl ServiceFormat {
    fn for_service(service: &str) -> Self {
        match service {
            "vies" => ServiceFormat::Vies,
            "handelsregister" => ServiceFormat::Handelsregister,
            "sanctions" => ServiceFormat::Sanctions,
            "whois" => ServiceFormat::Osint(Osint::Whois),
            "dns" => ServiceFormat::Osint(Osint::Dns),
            "ssllabs" => ServiceFormat::Osint(Osint::SslLabs),
            "security_headers" => ServiceFormat::Osint(Osint::SecurityHeaders),
            "robots" => ServiceFormat::Osint(Osint::Robots),
            "social_links" => ServiceFormat::Osint(Osint::SocialLinks),
            "email_basic" => ServiceFormat::Osint(Osint::EmailBasic),
            _ => ServiceFormat::Fallback,
        }
    }

    fn render(self, service: &str, data: &Value) -> Vec<Detail> {
        let empty = Map::new();
        let fields = data.as_object().unwrap_or(&empty);
        match self {
            ServiceFormat::Vies => render_vies(fields),
            ServiceFormat::Handelsregister => render_handelsregister(fields),
            ServiceFormat::Sanctions => render_sanctions(fields),
            ServiceFormat::Osint(kind) => render_osint(kind, service, data, fields),
            ServiceFormat::Fallback => vec![
                Detail::Heading("Ergebnis:".to_string()),
                Detail::Raw(pretty_json(data)),
            ],
        }
    }
}

fn render_vies(data: &Map<String, Value>) -> Vec<Detail> {
    let mut out = vec![Detail::Heading("USt-IdNr. Prüfung (VIES):".to_string())];
    out.push(field("Status USt-IdNr.", validity(flag(data, "valid"))));
    if let (Some(country), Some(number)) = (text(data, "country_code"), text(data, "vat_number")) {
        out.push(field("USt-IdNr.", format!("{country}{number}")));
    }
    if let Some(name) = text(data, "company_name") {
        out.push(field("Firmenname", name));
    }
    if let Some(address) = text(data, "company_address") {
        out.push(field("Adresse", address.replace('\n', ", ")));
    }
    if let Some(date) = text(data, "request_date") {
        out.push(field("Prüfdatum", date));
    }
    out
}

fn render_handelsregister(data: &Map<String, Value>) -> Vec<Detail> {
    let mut out = vec![Detail::Heading("Handelsregister (Deutschland):".to_string())];
    if let Some(message) = text(data, "message") {
        out.push(Detail::Alert {
            tone: Tone::Neutral,
            text: message,
        });
    }
    if let Some(total) = data.get("total_matches").filter(|v| !v.is_null()) {
        out.push(field("Gefundene Einträge", scalar(total)));
    }
    if let Some(best) = data.get("best_match").and_then(Value::as_object) {
        out.push(Detail::Heading("Beste Übereinstimmung:".to_string()));
        let labelled = [
            ("name", "Name"),
            ("registration_number", "Registernummer"),
            ("legal_form", "Rechtsform"),
            ("address", "Adresse"),
        ];
        for (key, label) in labelled {
            if let Some(value) = text(best, key) {
                out.push(field(label, value));
            }
        }
        if let Some(active) = flag(best, "active") {
            out.push(field("Aktiv", if active { "✅ Ja" } else { "❌ Nein" }));
        }
        if let Some(confidence) = best
            .get("match_confidence")
            .and_then(Value::as_f64)
            .filter(|c| *c > 0.0)
        {
            out.push(field("Trefferquote", format!("{}%", percent(confidence))));
        }
    }
    out
}

fn render_sanctions(data: &Map<String, Value>) -> Vec<Detail> {
    let mut out = vec![Detail::Heading(
        "Sanktionslisten (EU/OFAC/UK):".to_string(),
    )];
    if let Some(lists) = data.get("checked_lists").filter(|v| !v.is_null()) {
        out.push(field("Geprüfte Listen", joined(lists)));
    }
    let matches = data
        .get("matches")
        .and_then(Value::as_array)
        .filter(|m| !m.is_empty());
    match matches {
        Some(matches) => {
            out.push(Detail::Alert {
                tone: Tone::Danger,
                text: "⚠️ Treffer in Sanktionslisten gefunden!".to_string(),
            });
            for hit in matches.iter().filter_map(Value::as_object) {
                for (key, label) in [("name", "Name"), ("list", "Liste"), ("reason", "Grund")] {
                    if let Some(value) = text(hit, key) {
                        out.push(field(label, value));
                    }
                }
            }
        }
        None => out.push(Detail::Alert {
            tone: Tone::Success,
            text: "✅ Keine Treffer in Sanktionslisten".to_string(),
        }),
    }
    if let Some(updated) = text(data, "last_updated") {
        out.push(Detail::Note(format!("Letzte Aktualisierung: {updated}")));
    }
    out
}

fn render_osint(
    kind: Osint,
    service: &str,
    raw: &Value,
    data: &Map<String, Value>,
) -> Vec<Detail> {
    let title = match kind {
        Osint::Whois => "WHOIS-Informationen".to_string(),
        Osint::Dns => "DNS-Einträge".to_string(),
        Osint::SslLabs => "SSL-Zertifikat".to_string(),
        Osint::SecurityHeaders => "Sicherheits-Header".to_string(),
        Osint::Robots => "Robots.txt".to_string(),
        Osint::SocialLinks => "Soziale Netzwerke".to_string(),
        Osint::EmailBasic => "E-Mail-Prüfung".to_string(),
    };
    let mut out = vec![Detail::Heading(format!("{title}:"))];

    match data.get("status").and_then(Value::as_str) {
        Some("ok" | "success") => out.push(Detail::Alert {
            tone: Tone::Success,
            text: "Daten erfolgreich abgerufen".to_string(),
        }),
        Some("warn" | "warning") => out.push(Detail::Alert {
            tone: Tone::Warning,
            text: "Unvollständige Daten".to_string(),
        }),
        Some("error") => out.push(Detail::Alert {
            tone: Tone::Danger,
            text: "Fehler beim Datenabruf".to_string(),
        }),
        _ => {}
    }

    let specific = osint_specific(kind, data);
    let mut rendered = !specific.is_empty();
    out.extend(specific);

    if let Some(notes) = text(data, "notes") {
        out.push(Detail::Note(notes));
        rendered = true;
    }

    if !rendered {
        verifier_logging::verifier_trace!("no dedicated formatting for {service}, showing raw data");
        out.push(Detail::Raw(pretty_json(raw)));
    }
    out
}

fn osint_specific(kind: Osint, data: &Map<String, Value>) -> Vec<Detail> {
    let mut out = Vec::new();
    match kind {
        Osint::Whois => {
            let Some(domain) = data.get("domain_name").filter(|v| !v.is_null()) else {
                return out;
            };
            let domain = match domain {
                Value::Array(items) => items.first().map(scalar).unwrap_or_default(),
                other => scalar(other),
            };
            out.push(field("Domain", domain));
            for (key, label) in [
                ("registrar", "Registrar"),
                ("creation_date", "Erstellt"),
                ("expiration_date", "Läuft ab"),
            ] {
                if let Some(value) = text(data, key) {
                    out.push(field(label, value));
                }
            }
        }
        Osint::Dns => {
            let Some(records) = data.get("records").and_then(Value::as_object) else {
                return out;
            };
            out.push(Detail::Heading("DNS-Einträge:".to_string()));
            for (record_type, values) in records {
                out.push(field(record_type, joined(values)));
            }
        }
        Osint::SslLabs => {
            let Some(grade) = text(data, "grade") else {
                return out;
            };
            out.push(field("SSL-Bewertung", grade));
            for (key, label) in [("valid_from", "Gültig ab"), ("valid_until", "Gültig bis")] {
                if let Some(value) = text(data, key) {
                    out.push(field(label, value));
                }
            }
        }
        Osint::SecurityHeaders => {
            let score = data
                .get("security_score")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            out.push(field("Sicherheitsniveau", format!("{}/100", score.round() as i64)));
            if let Some(headers) = data.get("headers").and_then(Value::as_object) {
                for (name, value) in headers {
                    out.push(Detail::Note(format!("{name}: {}", scalar(value))));
                }
            }
        }
        Osint::Robots => {
            let Some(allowed) = data.get("allowed").filter(|v| !v.is_null()) else {
                return out;
            };
            out.push(field("Erlaubte Pfade", joined(allowed)));
            if let Some(disallowed) = data
                .get("disallowed")
                .and_then(Value::as_array)
                .filter(|d| !d.is_empty())
            {
                out.push(field(
                    "Gesperrte Pfade",
                    disallowed.iter().map(scalar).collect::<Vec<_>>().join(", "),
                ));
            }
        }
        Osint::SocialLinks => {
            let Some(profiles) = data.get("profiles").and_then(Value::as_array) else {
                return out;
            };
            for profile in profiles.iter().filter_map(Value::as_object) {
                if let (Some(platform), Some(url)) = (text(profile, "platform"), text(profile, "url"))
                {
                    out.push(Detail::Link {
                        label: platform,
                        url,
                    });
                }
            }
        }
        Osint::EmailBasic => {
            let Some(valid) = flag(data, "valid") else {
                return out;
            };
            out.push(field("Status E-Mail", validity(Some(valid))));
            if let Some(mx) = data.get("mx_records").filter(|v| !v.is_null()) {
                out.push(field("MX-Server", joined(mx)));
            }
        }
    }
    out
}

fn field(label: impl Into<String>, value: impl Into<String>) -> Detail {
    Detail::Field {
        label: label.into(),
        value: value.into(),
    }
}

fn validity(valid: Option<bool>) -> &'static str {
    if valid.unwrap_or(false) {
        "✅ Gültig"
    } else {
        "❌ Ungültig"
    }
}

fn text(data: &Map<String, Value>, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => Some(scalar(other)),
    }
}

fn flag(data: &Map<String, Value>, key: &str) -> Option<bool> {
    data.get(key).and_then(Value::as_bool)
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn joined(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(", "),
        other => scalar(other),
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
