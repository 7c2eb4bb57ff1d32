//! Retry and backoff policy for transport requests.
//!
//! Classifies failures (timeouts, connection errors, 5xx) and applies a linear
//! backoff so every transport shares one policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
