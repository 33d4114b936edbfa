// src/checker/normalize.rs
// =============================================================================
// This module turns raw user input into a URL we are willing to fetch.
//
// Steps:
// 1. Trim whitespace, reject empty input
// 2. Reject explicit non-HTTP schemes like ftp:// or file://
// 3. Prepend https:// when no http:// or https:// prefix is present
// 4. Parse with the `url` crate and re-check the scheme
//
// All of this is local: nothing here touches the network.
//
// Rust concepts:
// - Newtype pattern: NormalizedUrl wraps url::Url so the only way to get one
//   is through normalize()
// - Result<T, E>: Validation failures are returned, never panicked on
// =============================================================================

use serde::{Serialize, Serializer};
use std::fmt;
use url::Url;

use super::error::CheckFailure;

pub const URL_REQUIRED: &str = "URL is required.";
pub const UNSUPPORTED_SCHEME: &str = "Only HTTP and HTTPS URLs are supported.";

// A parsed, absolute http(s) URL
//
// There is no public constructor besides normalize(), so holding one means
// the URL has already been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    /// Canonical string form, exactly what goes on the wire
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NormalizedUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Normalizes user input into a fetchable URL
//
// Examples:
//   "example.com"          -> "https://example.com/"
//   "  HTTP://Example.com" -> "http://example.com/"
//   "ftp://host"           -> Err(Validation("Only HTTP and HTTPS URLs are supported."))
//   "   "                  -> Err(Validation("URL is required."))
pub fn normalize(raw_url: &str) -> Result<NormalizedUrl, CheckFailure> {
    // Remove leading/trailing whitespace (spaces, tabs, newlines)
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err(CheckFailure::validation(URL_REQUIRED));
    }

    // Decide the scheme before parsing:
    // - http:// or https:// (any case) is kept as typed
    // - any other "<scheme>://" is refused
    // - no scheme at all means https://
    let with_scheme = match explicit_scheme(trimmed) {
        Some(scheme) if is_http_scheme(scheme) => trimmed.to_string(),
        Some(_) => return Err(CheckFailure::validation(UNSUPPORTED_SCHEME)),
        None => format!("https://{}", trimmed),
    };

    // Parse and canonicalize (lowercase host, percent-encode the path, etc.)
    let parsed = Url::parse(&with_scheme)
        .map_err(|e| CheckFailure::validation(format!("Invalid URL: {}", e)))?;

    // Url lowercases the scheme while parsing
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CheckFailure::validation(UNSUPPORTED_SCHEME));
    }

    Ok(NormalizedUrl(parsed))
}

// Returns the scheme if the input starts with "<scheme>://"
//
// A scheme is a letter followed by letters, digits, '+', '-' or '.'.
// "localhost:8080" has no "://" and so has no explicit scheme.
fn explicit_scheme(input: &str) -> Option<&str> {
    let (scheme, _) = input.split_once("://")?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}

fn is_http_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a newtype?
//    - A tuple struct with one field, like `struct NormalizedUrl(Url)`
//    - The field is private, so code outside this file cannot build one
//    - The compiler then guarantees every NormalizedUrl went through normalize()
//
// 2. What does split_once do?
//    - Splits a &str at the first occurrence of a pattern
//    - Returns Some((before, after)), or None if the pattern is absent
//    - The `?` after it returns None from explicit_scheme() early
//
// 3. What is eq_ignore_ascii_case?
//    - Compares two strings ignoring ASCII upper/lower case
//    - "HTTPS" and "https" compare equal without allocating a lowercase copy
//
// 4. Why map_err before `?`
//    - Url::parse returns url::ParseError
//    - Our function returns CheckFailure
//    - map_err converts one error type into the other so `?` can propagate it
// -----------------------------------------------------------------------------
