use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::ProbeError;
use crate::target::Target;

pub const GQL_API_URL: &str = "https://gql.twitch.tv/gql";

const USE_LIVE_OPERATION: &str = "UseLive";
const USE_LIVE_SHA256: &str = "639d5f11bfb8bf3053b424d9ef650d04c4ebb7d94711d644afb08fe9a0fad5d9";

/// Which part of the response a live status was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// `data.user.stream.__typename`
    Primary,
    /// `playabilityStatus.status`. Whether this really means "live" is unclear.
    Legacy,
}

struct StatusStrategy {
    source: StatusSource,
    pointer: &'static str,
}

/// Highest precedence first. The first pointer resolving to a string decides,
/// even when that string is empty.
const STATUS_STRATEGIES: &[StatusStrategy] = &[
    StatusStrategy {
        source: StatusSource::Primary,
        pointer: "/data/user/stream/__typename",
    },
    StatusStrategy {
        source: StatusSource::Legacy,
        pointer: "/playabilityStatus/status",
    },
];

const START_TIME_POINTER: &str = "/data/user/stream/createdAt";

/// Outcome of a single status probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Live {
        status: String,
        source: StatusSource,
        /// `createdAt` exactly as the API returned it.
        started_at: Option<String>,
    },
    Offline,
    /// The request or the response decoding failed.
    Unknown,
}

impl ProbeResult {
    /// Classifies a decoded GQL response.
    ///
    /// Batched responses (a JSON array) are read from their first element.
    pub fn from_response(response: &Value) -> Self {
        let payload = match response {
            Value::Array(items) => match items.first() {
                Some(first) => first,
                None => return ProbeResult::Offline,
            },
            other => other,
        };

        let resolved = STATUS_STRATEGIES.iter().find_map(|strategy| {
            payload
                .pointer(strategy.pointer)
                .and_then(Value::as_str)
                .map(|status| (strategy.source, status))
        });

        match resolved {
            Some((source, status)) if !status.is_empty() => ProbeResult::Live {
                status: status.to_string(),
                source,
                started_at: payload
                    .pointer(START_TIME_POINTER)
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned),
            },
            _ => ProbeResult::Offline,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, ProbeResult::Live { .. })
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            ProbeResult::Live { status, .. } => Some(status.as_str()),
            _ => None,
        }
    }

    pub fn started_at(&self) -> Option<&str> {
        match self {
            ProbeResult::Live { started_at, .. } => started_at.as_deref(),
            _ => None,
        }
    }

    /// Stream start parsed as RFC 3339, if present and well-formed.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.started_at()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeResult::Live { status, .. } => f.write_str(status),
            ProbeResult::Offline => f.write_str("offline"),
            ProbeResult::Unknown => f.write_str("unknown"),
        }
    }
}

/// Queries the `UseLive` persisted operation for a channel.
#[derive(Debug, Clone)]
pub struct StreamStatusProber {
    client: Client,
    endpoint: String,
    sha256_hash: String,
}

impl StreamStatusProber {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: GQL_API_URL.to_string(),
            sha256_hash: USE_LIVE_SHA256.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_persisted_query_hash(mut self, sha256_hash: impl Into<String>) -> Self {
        self.sha256_hash = sha256_hash.into();
        self
    }

    fn build_persisted_query_request(&self, login: &str) -> Value {
        serde_json::json!([{
            "operationName": USE_LIVE_OPERATION,
            "variables": {
                "channelLogin": login,
            },
            "extensions": {
                "persistedQuery": {
                    "version": 1,
                    "sha256Hash": self.sha256_hash,
                }
            },
        }])
    }

    async fn query(&self, target: &Target, credential: &Credential) -> Result<Value, ProbeError> {
        let body = self.build_persisted_query_request(target.login());
        let bytes = self
            .client
            .post(&self.endpoint)
            .header("Client-Id", credential.as_str())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        debug!("body: {}", String::from_utf8_lossy(&bytes));

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Never fails: transport and decoding problems come back as [`ProbeResult::Unknown`].
    pub async fn probe(&self, target: &Target, credential: &Credential) -> ProbeResult {
        match self.query(target, credential).await {
            Ok(response) => ProbeResult::from_response(&response),
            Err(e) if e.is_network_failure() => {
                warn!(error = %e, "Status request failed");
                ProbeResult::Unknown
            }
            Err(e) => {
                warn!(error = %e, "Status response could not be decoded");
                ProbeResult::Unknown
            }
        }
    }
}
