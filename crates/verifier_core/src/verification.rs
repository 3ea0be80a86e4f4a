use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::field::FieldId;

/// Snapshot of every form value at submit time. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    fields: Vec<(FieldId, String)>,
}

impl VerificationRequest {
    pub fn new(fields: Vec<(FieldId, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, id: FieldId) -> &str {
        self.fields
            .iter()
            .find(|(field, _)| *field == id)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    pub fn fields(&self) -> &[(FieldId, String)] {
        &self.fields
    }
}

impl Serialize for VerificationRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (id, value) in &self.fields {
            map.serialize_entry(id.name(), value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Valid,
    Warning,
    Error,
    #[default]
    #[serde(other)]
    Pending,
}

/// Per-service status. Services report a wider vocabulary than the overall
/// verdict; anything unrecognised is treated as still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Valid,
    Warning,
    Error,
    Ok,
    Success,
    Warn,
    #[default]
    #[serde(other)]
    Pending,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ServiceResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ServiceStatus,
    #[serde(default, alias = "confidence_score", deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub response_time_ms: Option<f64>,
}

/// Successful `/verify` payload. `results` keeps the server's key order,
/// which is also the display order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct VerificationResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub overall_status: OverallStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "opaque_id")]
    pub check_id: String,
    #[serde(default, deserialize_with = "ordered_results")]
    pub results: Vec<(String, ServiceResult)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaLimit {
    Count(u64),
    Unlimited,
}

impl Default for QuotaLimit {
    fn default() -> Self {
        QuotaLimit::Count(5)
    }
}

impl fmt::Display for QuotaLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaLimit::Count(limit) => write!(f, "{limit}"),
            QuotaLimit::Unlimited => write!(f, "∞"),
        }
    }
}

impl<'de> Deserialize<'de> for QuotaLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_u64()
                .map(QuotaLimit::Count)
                .ok_or_else(|| de::Error::custom("quota limit must be a non-negative integer")),
            Value::String(s) if s.eq_ignore_ascii_case("unlimited") => Ok(QuotaLimit::Unlimited),
            Value::String(s) => s
                .trim()
                .parse()
                .map(QuotaLimit::Count)
                .map_err(|_| de::Error::custom(format!("unrecognised quota limit {s:?}"))),
            _ => Ok(QuotaLimit::default()),
        }
    }
}

/// Usage figures carried by a quota-exhausted rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaNotice {
    pub plan: String,
    pub usage: u64,
    pub limit: QuotaLimit,
}

impl Default for QuotaNotice {
    fn default() -> Self {
        Self {
            plan: "Free".to_string(),
            usage: 0,
            limit: QuotaLimit::default(),
        }
    }
}

/// An explicit `null` reads like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

pub(crate) fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn ordered_results<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<(String, ServiceResult)>, D::Error> {
    struct OrderedResults;

    impl<'de> Visitor<'de> for OrderedResults {
        type Value = Vec<(String, ServiceResult)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of service id to service result")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((service, result)) = access.next_entry::<String, ServiceResult>()? {
                entries.push((service, result));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_any(OrderedResults)
}
