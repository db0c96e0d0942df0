use std::fmt;

use url::Url;

use crate::error::ProbeError;

/// A channel login derived from the user-supplied channel URL.
///
/// `https://twitch.tv/some_user` becomes `some_user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
    login: String,
}

impl Target {
    pub fn parse(channel_url: &str) -> Result<Self, ProbeError> {
        let url =
            Url::parse(channel_url).map_err(|_| ProbeError::InvalidUrl(channel_url.to_string()))?;

        let login = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| ProbeError::InvalidUrl(channel_url.to_string()))?
            .to_string();

        Ok(Self { url, login })
    }

    /// The channel login sent as `channelLogin`.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// The page the credential is scraped from.
    pub fn page_url(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.login)
    }
}
