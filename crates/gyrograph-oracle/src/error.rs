//! Error types for oracle queries.
//!
//! Oracle errors never reach the caller of a computation: the verifier turns
//! them into an `UNAVAILABLE` validation record with the error as reason.

use thiserror::Error;

/// Result alias for oracle operations.
pub type OracleResult<T> = Result<T, OracleError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    // ========== Transport Errors ==========
    /// Connection, DNS or TLS failure, or a client-side request timeout.
    #[error("Oracle transport failure: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("Oracle returned HTTP {status}")]
    Http { status: u16 },

    // ========== Answer Errors ==========
    /// The oracle answered but could not interpret the query.
    #[error("Oracle could not interpret the query: {0}")]
    Uninterpretable(String),

    /// The answer did not contain a usable number.
    #[error("Malformed oracle answer: {0}")]
    MalformedAnswer(String),

    // ========== Configuration Errors ==========
    #[error("Oracle not configured: {0}")]
    NotConfigured(String),
}

impl OracleError {
    /// Transport failures, server errors and rate limiting are retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Http {
                status: status.as_u16(),
            },
            None => Self::Transport(e.to_string()),
        }
    }
}
