//! Errors raised while listing a remote collection

use thiserror::Error;

/// A failed list call
///
/// The paginator never retries or interprets these; they are handed back to
/// the caller together with the counts of what was delivered before the
/// failure.
#[derive(Debug, Error)]
pub enum ListError {
    /// The call never completed (connection refused, DNS, timeout, unreadable body)
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a semantic failure
    #[error("{code} (HTTP {status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// The service handed back the continuation token it was just given
    #[error("service returned an unchanged continuation token '{0}'")]
    StalledCursor(String),

    /// The request was rejected before any call was issued
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ListError {
    /// Short classification used in summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Service { .. } => "service",
            Self::StalledCursor(_) => "cursor",
            Self::InvalidRequest(_) => "request",
        }
    }
}
