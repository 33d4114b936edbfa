// src/checker/outcome.rs
// =============================================================================
// The data that crosses the boundary between the checker and its callers.
//
// - CheckRequest: what a caller sends ({ url, timeoutMs? })
// - CheckResult: a successful check
// - CheckResponse: the JSON body every caller sees, success or failure
//
// JSON field names are camelCase to match the public contract:
//   { ok: true, url, finalUrl, status, responseTimeMs, checkedAt }
//   { ok: false, error }
// =============================================================================

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::error::CheckFailure;
use super::normalize::NormalizedUrl;

// A single check as requested by a caller
//
// Both fields are optional at the JSON level: a missing url is reported as
// "URL is required." by the normalizer, a missing timeout uses the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<f64>,
}

impl CheckRequest {
    pub fn new(url: impl Into<String>, timeout_ms: Option<f64>) -> Self {
        Self {
            url: Some(url.into()),
            timeout_ms,
        }
    }
}

// A successful check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    /// The normalized URL that was requested
    #[serde(rename = "url")]
    pub requested_url: NormalizedUrl,
    /// Where the redirect chain ended (may equal requested_url)
    #[serde(rename = "finalUrl")]
    pub final_url: String,
    /// Status code of the terminal response
    #[serde(rename = "status")]
    pub status_code: u16,
    /// Milliseconds from dispatch until response headers arrived
    #[serde(rename = "responseTimeMs")]
    pub elapsed_ms: u64,
    /// When this result was produced
    #[serde(rename = "checkedAt", serialize_with = "serialize_timestamp")]
    pub checked_at: DateTime<Utc>,
}

// The JSON body for either outcome
//
// #[serde(untagged)] writes the fields of whichever variant is present
// without wrapping them in the variant name.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CheckResponse {
    Success {
        ok: bool,
        #[serde(flatten)]
        result: CheckResult,
    },
    Failure {
        ok: bool,
        error: String,
    },
}

impl CheckResponse {
    pub fn success(result: CheckResult) -> Self {
        CheckResponse::Success { ok: true, result }
    }

    pub fn failure(failure: &CheckFailure) -> Self {
        CheckResponse::Failure {
            ok: false,
            error: failure.message(),
        }
    }
}

impl From<Result<CheckResult, CheckFailure>> for CheckResponse {
    fn from(outcome: Result<CheckResult, CheckFailure>) -> Self {
        match outcome {
            Ok(result) => CheckResponse::success(result),
            Err(failure) => CheckResponse::failure(&failure),
        }
    }
}

// ISO-8601 in UTC with millisecond precision, e.g. 2025-01-01T12:00:00.123Z
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(at))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[serde(rename = "...")] do?
//    - Uses a different name in JSON than in Rust
//    - Rust fields stay snake_case, JSON keys follow the public contract
//
// 2. What is #[serde(flatten)]?
//    - Writes the fields of an inner struct directly into the outer object
//    - { ok: true, url, ... } instead of { ok: true, result: { url, ... } }
//
// 3. What is serialize_with?
//    - Points serde at a custom function for one field
//    - Here it formats the timestamp with exactly three fractional digits
//
// 4. Why Option<String> for url?
//    - A missing or null "url" key still deserializes
//    - The normalizer then reports "URL is required." instead of a JSON error
// -----------------------------------------------------------------------------
