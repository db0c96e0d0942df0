use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::default_client;
use crate::clock::{Clock, SystemClock};
use crate::credential::CredentialFetcher;
use crate::error::{Phase, ProbeError};
use crate::retry::{BackoffPolicy, RetryScheduler};
use crate::status::{ProbeResult, StreamStatusProber};
use crate::target::Target;

/// Settings for one check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Keep polling until the channel is live.
    #[serde(default)]
    pub wait: bool,
    /// Wall-clock budget per phase in seconds. 0 disables the bound.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub backoff: BackoffPolicy,
}

fn default_timeout_secs() -> u64 {
    300
}

impl CheckConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            wait: false,
            timeout_secs: default_timeout_secs(),
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Runs the credential phase, then the status phase.
pub struct LiveChecker<C = SystemClock> {
    fetcher: CredentialFetcher,
    prober: StreamStatusProber,
    scheduler: RetryScheduler<C>,
}

impl LiveChecker<SystemClock> {
    pub fn new(config: &CheckConfig) -> Result<Self, ProbeError> {
        let client = default_client()?;
        Ok(Self::from_parts(
            CredentialFetcher::new(client.clone()),
            StreamStatusProber::new(client),
            RetryScheduler::new(
                SystemClock,
                config.backoff.clone(),
                config.wait,
                config.timeout(),
            ),
        ))
    }
}

impl<C: Clock> LiveChecker<C> {
    pub fn from_parts(
        fetcher: CredentialFetcher,
        prober: StreamStatusProber,
        scheduler: RetryScheduler<C>,
    ) -> Self {
        Self {
            fetcher,
            prober,
            scheduler,
        }
    }

    /// Only a [`ProbeResult::Live`] counts as success; offline and unknown
    /// results are returned as values, not errors.
    pub async fn check(&self, channel_url: &str) -> Result<ProbeResult, ProbeError> {
        let target = Target::parse(channel_url)?;
        debug!(login = target.login(), "Resolved channel");

        let page_url = target.page_url();
        let credential = self
            .scheduler
            .retry_until_ok(Phase::Credential, |_| self.fetcher.fetch(page_url))
            .await?;
        debug!("Client ID: {}", credential);

        info!("Checking for stream status");
        let (target, credential) = (&target, &credential);
        self.scheduler
            .poll_until(
                Phase::Status,
                |_| async move {
                    let result = self.prober.probe(target, credential).await;
                    info!("{result}");
                    result
                },
                ProbeResult::is_live,
            )
            .await
    }
}
