//! German UI strings.

pub const FIELD_REQUIRED: &str = "Dieses Feld ist erforderlich";
pub const INVALID_VAT_FORMAT: &str = "Ungültiges USt-IdNr. Format für";
pub const UNKNOWN_ERROR: &str = "Unbekannter Fehler";
pub const CONNECTION_ERROR: &str = "Verbindungsfehler:";
pub const FILL_FORM: &str =
    "Füllen Sie die Formulare aus und klicken Sie auf \"Prüfung starten\"";
pub const PROCESSING: &str = "Wird verarbeitet...";
pub const SEARCHING: &str = "USt-IdNr. wird abgefragt...";
pub const LOOKUP_FAILED: &str = "Firmendaten konnten nicht geladen werden";

pub const SUBMIT_IDLE: &str = "Prüfung starten";
pub const SUBMIT_BUSY: &str = "Prüfung läuft...";

pub const OVERALL_RESULT: &str = "Gesamtergebnis:";
pub const CHECK_ID: &str = "Prüfung ID";
pub const RESPONSE_TIME: &str = "Antwortzeit:";

pub const QUOTA_HEADING: &str = "Prüfungslimit erreicht";
pub const QUOTA_UPGRADE_HINT: &str =
    "Upgraden Sie Ihren Plan, um weitere Prüfungen durchzuführen:";
pub const QUOTA_UPGRADE_LABEL: &str = "Plan upgraden";
pub const QUOTA_UPGRADE_URL: &str = "/payments";
pub const QUOTA_DASHBOARD_LABEL: &str = "Zum Dashboard";
pub const QUOTA_DASHBOARD_URL: &str = "/dashboard";

/// Sentence explaining which plan ran out.
pub fn quota_reached(plan: &str) -> String {
    format!("Sie haben Ihr monatliches Prüfungslimit für den {plan}-Plan erreicht.")
}

/// Format complaint with an example number for the country.
pub fn invalid_vat_format(country: &str, example: &str) -> String {
    format!("{INVALID_VAT_FORMAT} {country} (z. B. {example})")
}

pub fn connection_error(detail: &str) -> String {
    format!("{CONNECTION_ERROR} {detail}")
}
