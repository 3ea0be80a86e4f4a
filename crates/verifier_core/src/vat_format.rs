use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// (country, pattern, example) for every country with a known VAT layout.
const FORMATS: &[(&str, &str, &str)] = &[
    ("AT", r"^ATU[0-9]{8}$", "ATU12345678"),
    ("BE", r"^BE[0-9]{10}$", "BE1234567890"),
    ("BG", r"^BG[0-9]{9,10}$", "BG1234567890"),
    ("CY", r"^CY[0-9]{8}[A-Z]$", "CY12345678A"),
    ("CZ", r"^CZ[0-9]{8,10}$", "CZ12345678"),
    ("DE", r"^DE[0-9]{9}$", "DE123456789"),
    ("DK", r"^DK[0-9]{8}$", "DK12345678"),
    ("EE", r"^EE[0-9]{9}$", "EE123456789"),
    ("EL", r"^EL[0-9]{9}$", "EL123456789"),
    ("ES", r"^ES[0-9A-Z][0-9]{7}[0-9A-Z]$", "ES12345678A"),
    ("FI", r"^FI[0-9]{8}$", "FI12345678"),
    ("FR", r"^FR[0-9A-Z]{2}[0-9]{9}$", "FRAB123456789"),
    ("GB", r"^GB([0-9]{9}([0-9]{3})?|[A-Z]{2}[0-9]{3})$", "GB123456789"),
    ("HR", r"^HR[0-9]{11}$", "HR12345678901"),
    ("HU", r"^HU[0-9]{8}$", "HU12345678"),
    ("IE", r"^IE[0-9]{7}[A-Z]{1,2}$", "IE1234567AB"),
    ("IT", r"^IT[0-9]{11}$", "IT12345678901"),
    ("LT", r"^LT([0-9]{9}|[0-9]{12})$", "LT123456789"),
    ("LU", r"^LU[0-9]{8}$", "LU12345678"),
    ("LV", r"^LV[0-9]{11}$", "LV12345678901"),
    ("MT", r"^MT[0-9]{8}$", "MT12345678"),
    ("NL", r"^NL[0-9]{9}B[0-9]{2}$", "NL123456789B01"),
    ("PL", r"^PL[0-9]{10}$", "PL1234567890"),
    ("PT", r"^PT[0-9]{9}$", "PT123456789"),
    ("RO", r"^RO[0-9]{2,10}$", "RO1234567890"),
    ("SE", r"^SE[0-9]{12}$", "SE123456789012"),
    ("SI", r"^SI[0-9]{8}$", "SI12345678"),
    ("SK", r"^SK[0-9]{10}$", "SK1234567890"),
];

const DEFAULT_HINT: &str = "DE123456789";

static PATTERNS: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    FORMATS
        .iter()
        .filter_map(|(country, pattern, _)| Regex::new(pattern).ok().map(|re| (*country, re)))
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCheck {
    /// Nothing to check: empty value or unknown country.
    Unchecked,
    Valid,
    Invalid,
}

/// Checks an uppercased VAT number against the pattern of `country`.
pub fn check_vat_format(country: &str, vat: &str) -> FormatCheck {
    let vat = vat.trim().to_ascii_uppercase();
    let country = country.trim().to_ascii_uppercase();
    if vat.is_empty() || country.is_empty() {
        return FormatCheck::Unchecked;
    }
    match PATTERNS.get(country.as_str()) {
        Some(re) if re.is_match(&vat) => FormatCheck::Valid,
        Some(_) => FormatCheck::Invalid,
        None => FormatCheck::Unchecked,
    }
}

/// Example VAT number for the country, or a generic German one.
pub fn format_hint(country: &str) -> &'static str {
    let country = country.trim().to_ascii_uppercase();
    FORMATS
        .iter()
        .find(|(code, _, _)| *code == country)
        .map(|(_, _, hint)| *hint)
        .unwrap_or(DEFAULT_HINT)
}
