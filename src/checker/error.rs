// src/checker/error.rs
// =============================================================================
// The closed set of ways a single check can fail.
//
// Every failure produced by normalization, timeout validation or the timed
// fetch ends up as exactly one of three variants. Callers (the HTTP routes
// and the CLI) match on the variant to pick their own status code or exit
// code; that mapping lives with each caller, not here. The messages returned
// to callers are fixed for Timeout and Network. Only Validation messages
// vary, and those are safe to display.
//
// Rust concepts:
// - thiserror: Derives std::error::Error and Display from attributes
// - Exhaustive match: Adding a variant forces every caller to handle it
// =============================================================================

use thiserror::Error;

/// Message returned for every timed-out check
pub const TIMEOUT_MESSAGE: &str = "Request timeout.";

/// Message returned for every transport failure
pub const NETWORK_MESSAGE: &str = "Failed to check URL.";

// The result of a check that did not produce a CheckResult
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckFailure {
    /// Missing, malformed or unsupported input. Never touches the network.
    #[error("{0}")]
    Validation(String),
    /// The deadline elapsed before response headers arrived
    #[error("Request timeout.")]
    Timeout,
    /// DNS, connect, TLS, protocol or any other unexpected failure
    #[error("Failed to check URL.")]
    Network,
}

/// Classification of a failure, independent of its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Timeout,
    Network,
}

impl CheckFailure {
    // Shorthand used by the normalizer and the timeout validator
    pub fn validation(message: impl Into<String>) -> Self {
        CheckFailure::Validation(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CheckFailure::Validation(_) => FailureKind::Validation,
            CheckFailure::Timeout => FailureKind::Timeout,
            CheckFailure::Network => FailureKind::Network,
        }
    }

    // The message shown to callers. Validation passes through verbatim.
    pub fn message(&self) -> String {
        match self {
            CheckFailure::Validation(message) => message.clone(),
            CheckFailure::Timeout => TIMEOUT_MESSAGE.to_string(),
            CheckFailure::Network => NETWORK_MESSAGE.to_string(),
        }
    }
}

// Classifies a transport error from reqwest
//
// Only two outcomes are possible: a transport-level timeout is a Timeout,
// everything else (DNS, refused connection, TLS, redirect loop, protocol
// errors) is a Network failure. The cause is logged, not returned.
impl From<reqwest::Error> for CheckFailure {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            CheckFailure::Timeout
        } else {
            tracing::debug!(error = %error, "transport failure");
            CheckFailure::Network
        }
    }
}
