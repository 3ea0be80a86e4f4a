//! Maps a raw `(status, body)` pair from the backend onto a typed result.
//!
//! The backend answers both endpoints with a JSON envelope carrying a
//! `success` flag. Anything else is a transport-level failure.
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use verifier_core::{LookupMessage, LookupPayload, QuotaLimit, QuotaNotice, VerificationResult};

use crate::ClientError;

pub fn classify_lookup(status: u16, body: &[u8]) -> Result<LookupPayload, ClientError> {
    classify(status, body)
}

pub fn classify_verification(status: u16, body: &[u8]) -> Result<VerificationResult, ClientError> {
    classify(status, body)
}

fn classify<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ClientError> {
    let success_status = (200..300).contains(&status);
    let envelope = match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) if success_status => {
            return Err(ClientError::InvalidBody("expected a JSON object".to_string()))
        }
        Err(err) if success_status => return Err(ClientError::InvalidBody(err.to_string())),
        Ok(_) | Err(_) => return Err(ClientError::HttpStatus { status }),
    };

    if status == 401 {
        if let Some(redirect) = non_empty_str(&envelope, "redirect") {
            return Err(ClientError::AuthExpired {
                redirect: redirect.to_string(),
            });
        }
    }

    if envelope.get("success").and_then(Value::as_bool) == Some(true) {
        // Decoded from the raw bytes so map-valued fields keep the server's key order.
        return serde_json::from_slice(body)
            .map_err(|err| ClientError::InvalidBody(err.to_string()));
    }

    if is_quota_rejection(&envelope) {
        return Err(ClientError::QuotaExceeded(quota_notice(&envelope)));
    }

    Err(ClientError::Domain {
        error: non_empty_str(&envelope, "error").map(str::to_string),
        messages: envelope
            .get("messages")
            .and_then(|messages| Vec::<LookupMessage>::deserialize(messages).ok())
            .unwrap_or_default(),
    })
}

fn is_quota_rejection(envelope: &Value) -> bool {
    envelope.get("upgrade_required").and_then(Value::as_bool) == Some(true)
        || envelope.get("limit").is_some_and(|limit| !limit.is_null())
}

/// Missing usage figures fall back to the free plan's defaults.
fn quota_notice(envelope: &Value) -> QuotaNotice {
    let defaults = QuotaNotice::default();
    QuotaNotice {
        plan: non_empty_str(envelope, "current_plan")
            .map(str::to_string)
            .unwrap_or(defaults.plan),
        usage: envelope
            .get("current_usage")
            .and_then(Value::as_u64)
            .unwrap_or(defaults.usage),
        limit: envelope
            .get("limit")
            .and_then(|limit| QuotaLimit::deserialize(limit).ok())
            .unwrap_or(defaults.limit),
    }
}

fn non_empty_str<'a>(envelope: &'a Value, key: &str) -> Option<&'a str> {
    envelope
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}
