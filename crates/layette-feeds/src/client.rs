//! Shared HTTP client for affiliate and registry feeds.

use std::time::Duration;

use serde_json::Value;

use crate::error::FeedError;

/// Thin wrapper over `reqwest::Client` with the feed conventions baked in:
/// bounded total timeout, explicit `Accept` headers, optional bearer auth,
/// and typed status/deserialization errors.
///
/// No retries; a failed feed fetch is reported to the caller and can be
/// re-triggered externally.
pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    /// Creates a `FeedClient` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`FeedError::UnexpectedStatus`] — any non-2xx status.
    /// - [`FeedError::Http`] — network failure or timeout.
    pub async fn get_text(
        &self,
        url: &str,
        accept: &str,
        bearer: Option<&str>,
    ) -> Result<String, FeedError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetches `url` as JSON. The body is parsed into a raw
    /// `serde_json::Value` so per-source envelope adapters can probe the
    /// payload shape.
    ///
    /// # Errors
    ///
    /// - [`FeedError::UnexpectedStatus`] — any non-2xx status.
    /// - [`FeedError::Http`] — network failure or timeout.
    /// - [`FeedError::Deserialize`] — body is not valid JSON.
    pub async fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<Value, FeedError> {
        self.get_json_with_query(url, &[], bearer).await
    }

    /// Like [`get_json`](FeedClient::get_json) with extra query parameters
    /// appended to the request URL.
    ///
    /// # Errors
    ///
    /// Same as [`get_json`](FeedClient::get_json).
    pub async fn get_json_with_query(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<Value, FeedError> {
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FeedError::Deserialize {
            context: format!("feed response from {url}"),
            source: e,
        })
    }
}
