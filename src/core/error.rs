//! Failure taxonomy for the rate pipeline.

use crate::core::currency::CurrencyCode;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateError {
    /// Bad caller input. Reported as a client error, never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network failure, timeout, or non-success upstream status. Transient;
    /// the caller may re-invoke.
    #[error("upstream unavailable while fetching [{codes}]: {reason}")]
    UpstreamUnavailable { codes: String, reason: String },

    /// The body failed structural parsing even after token repair.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    /// The body parsed but does not have the documented shape.
    #[error("unexpected upstream schema: {0}")]
    UnexpectedSchema(String),

    /// Store read or write failure. The persisted artifact keeps its
    /// last-good contents.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl RateError {
    /// Upstream failure tagged with the codes that were being fetched.
    pub fn upstream(codes: &[CurrencyCode], reason: impl fmt::Display) -> Self {
        RateError::UpstreamUnavailable {
            codes: codes
                .iter()
                .map(CurrencyCode::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            reason: reason.to_string(),
        }
    }

    /// Store failure with the underlying cause.
    pub fn persistence(reason: impl fmt::Display) -> Self {
        RateError::Persistence(reason.to_string())
    }
}
