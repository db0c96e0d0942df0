use std::fmt;

use thiserror::Error;

/// The retry-governed stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Credential,
    Status,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Credential => f.write_str("base info"),
            Phase::Status => f.write_str("stream status"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid channel url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("tls error: {0}")]
    Tls(#[from] rustls::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("page is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("client id not found in page")]
    CredentialNotFound,
    #[error("Unable to fetch {phase} after {elapsed} seconds and {attempts} attempts")]
    Timeout {
        phase: Phase,
        elapsed: u64,
        attempts: u32,
        /// Failure of the last attempt, when the phase retries on errors.
        #[source]
        last_error: Option<Box<ProbeError>>,
    },
}

impl ProbeError {
    /// Transport-level failures: connection, DNS, timeouts, bad status codes.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, ProbeError::Network(_) | ProbeError::Tls(_))
    }

    /// The response arrived but did not contain what we were looking for.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            ProbeError::Json(_) | ProbeError::Utf8(_) | ProbeError::CredentialNotFound
        )
    }
}
