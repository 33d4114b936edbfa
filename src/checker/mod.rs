// src/checker/mod.rs
// =============================================================================
// This module contains the URL checking logic.
//
// Submodules:
// - normalize: Turns raw input into a validated http(s) URL
// - timeout: Resolves and range-checks the per-check timeout
// - http: Makes the time-bounded GET request
// - outcome: Request/result/response types shared with callers
// - error: The three ways a check can fail
//
// Everything a caller needs is re-exported here, so the server and the CLI
// write `checker::Checker` rather than `checker::http::Checker`.
// =============================================================================

mod error;
mod http;
mod normalize;
mod outcome;
mod timeout;

pub use error::{CheckFailure, FailureKind};
pub use http::Checker;
pub use outcome::{format_timestamp, CheckRequest, CheckResponse, CheckResult};
pub use timeout::DEFAULT_TIMEOUT_MS;

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why are the submodules private (`mod`, not `pub mod`)?
//    - Callers only see what is re-exported below
//    - Internal helpers (explicit_scheme, round_millis, ...) stay hidden
//
// 2. What does `pub use` do?
//    - Re-exports an item under this module's path
//    - `checker::Checker` works without knowing it lives in http.rs
// -----------------------------------------------------------------------------
