use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::ProbeError;

static CLIENT_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"clientId="([^"]+)""#).unwrap());

/// Short-lived client id scraped from a public page. Lives only for the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pulls the first `clientId="..."` out of a page body.
    pub fn find_in(body: &str) -> Option<Self> {
        CLIENT_ID_REGEX
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| Self::new(m.as_str()))
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetches the bootstrap page and extracts the client id. Never retries.
#[derive(Debug, Clone)]
pub struct CredentialFetcher {
    client: Client,
}

impl CredentialFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, page_url: &str) -> Result<Credential, ProbeError> {
        info!("Fetching page...");

        let bytes = self
            .client
            .get(page_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        debug!(len = bytes.len(), "page fetched");

        let body = String::from_utf8(bytes.to_vec())?;

        Credential::find_in(&body).ok_or(ProbeError::CredentialNotFound)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;
    use crate::client::test_client;

    #[test]
    fn finds_first_client_id() {
        let body = r#"<script>window.__x={clientId="abc123",other:1};clientId="zzz"</script>"#;
        assert_eq!(Credential::find_in(body), Some(Credential::new("abc123")));
    }

    #[test]
    fn no_match_yields_none() {
        assert_eq!(Credential::find_in("<html>clientId=abc123</html>"), None);
        assert_eq!(Credential::find_in(r#"clientId="""#), None);
    }

    #[tokio::test]
    async fn fetch_returns_scraped_client_id() {
        let server = MockServer::start_async().await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET).path("/some_user");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<html><script>clientId="abc123"</script></html>"#);
            })
            .await;

        let fetcher = CredentialFetcher::new(test_client());
        let credential = fetcher.fetch(&server.url("/some_user")).await.unwrap();

        assert_eq!(credential.as_str(), "abc123");
        page.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_without_pattern_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/some_user");
                then.status(200).body("<html></html>");
            })
            .await;

        let fetcher = CredentialFetcher::new(test_client());
        let err = fetcher.fetch(&server.url("/some_user")).await.unwrap_err();
        assert!(matches!(err, ProbeError::CredentialNotFound));
    }

    #[tokio::test]
    async fn fetch_rejects_body_that_is_not_utf8() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/some_user");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(b"\xff\xfe clientId=\"abc123\"x".to_vec());
            })
            .await;

        let fetcher = CredentialFetcher::new(test_client());
        let err = fetcher.fetch(&server.url("/some_user")).await.unwrap_err();
        assert!(matches!(err, ProbeError::Utf8(_)));
        assert!(err.is_parse_failure());
    }

    #[tokio::test]
    async fn fetch_on_error_status_is_network_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/some_user");
                then.status(503).body(r#"clientId="abc123""#);
            })
            .await;

        let fetcher = CredentialFetcher::new(test_client());
        let err = fetcher.fetch(&server.url("/some_user")).await.unwrap_err();
        assert!(err.is_network_failure());
    }
}
