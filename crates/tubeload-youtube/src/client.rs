//! HTTP client for the YouTube Data API.
//!
//! Wraps `reqwest` with API key handling, typed response deserialization and
//! translation of Google's error envelope into [`YoutubeError`]. There is no
//! retry: every failure is surfaced to the caller.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::YoutubeError;
use crate::fetch::MAX_PLAYLIST_PAGES;
use crate::types::ErrorEnvelope;

const DEFAULT_API_ROOT: &str = "https://www.googleapis.com/";

/// Client for the YouTube Data API.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    pub(crate) max_playlist_pages: usize,
}

impl YoutubeClient {
    /// Creates a client for `https://www.googleapis.com/<service>/<version>/`.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        api_service_name: &str,
        api_version: &str,
        timeout_secs: u64,
    ) -> Result<Self, YoutubeError> {
        let base = format!("{DEFAULT_API_ROOT}{api_service_name}/{api_version}");
        Self::with_base_url(api_key, timeout_secs, &base)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`YoutubeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tubeload/0.1 (channel-analytics)")
            .build()?;

        // Exactly one trailing slash so `join` appends the resource name
        // instead of replacing the version segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_playlist_pages: MAX_PLAYLIST_PAGES,
        })
    }

    /// Override how many pages one playlist may span before
    /// [`YoutubeError::PaginationLimit`] is returned.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_playlist_pages = max_pages;
        self
    }

    /// Builds `<base>/<resource>?key=..&<params>` with percent-encoded values.
    pub(crate) fn build_url(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, YoutubeError> {
        let mut url = self
            .base_url
            .join(resource)
            .map_err(|e| YoutubeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request and deserializes the body into `T`.
    ///
    /// `context` names the call in error messages; it never contains the key.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`] / [`YoutubeError::Api`] on non-2xx.
    /// - [`YoutubeError::Http`] on network failure.
    /// - [`YoutubeError::Deserialize`] if the body does not match `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, YoutubeError> {
        tracing::debug!(request = context, "YouTube API request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Maps a non-2xx body to a typed error, falling back to the raw status
    /// when the body is not Google's error envelope.
    fn api_error(status: u16, body: &str) -> YoutubeError {
        let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
            return YoutubeError::Api {
                status,
                reason: "unknown".to_string(),
                message: body.chars().take(200).collect(),
            };
        };

        let reason = envelope
            .error
            .errors
            .first()
            .map_or_else(|| "unknown".to_string(), |d| d.reason.clone());
        if matches!(
            reason.as_str(),
            "quotaExceeded" | "dailyLimitExceeded" | "rateLimitExceeded"
        ) {
            return YoutubeError::QuotaExceeded(envelope.error.message);
        }
        YoutubeError::Api {
            status,
            reason,
            message: envelope.error.message,
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
