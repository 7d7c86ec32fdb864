use std::fmt::Debug;

use async_trait::async_trait;
use derive_more::Display;
use log::{debug, trace, warn};
#[cfg(any(test, feature = "testing"))]
use mockall::automock;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, ClientBuilder};

use crate::core::config::SubtitleProperties;
use crate::core::subtitles::FetchError;

/// The network collaborator which retrieves the raw text of a subtitle location.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait SubtitleFetcher: Debug + Send + Sync {
    /// Fetch the text at the given location.
    ///
    /// It returns the body text on success, else the [FetchError] describing the status or transport failure.
    async fn fetch_text(&self, location: &str) -> Result<String, FetchError>;
}

/// The HTTP implementation of the [SubtitleFetcher].
#[derive(Debug, Display)]
#[display("HTTP subtitle fetcher")]
pub struct HttpSubtitleFetcher {
    client: Client,
}

impl HttpSubtitleFetcher {
    /// Returns a new builder instance to configure the fetcher.
    pub fn builder() -> HttpSubtitleFetcherBuilder {
        HttpSubtitleFetcherBuilder::default()
    }
}

#[async_trait]
impl SubtitleFetcher for HttpSubtitleFetcher {
    async fn fetch_text(&self, location: &str) -> Result<String, FetchError> {
        debug!("Fetching subtitle text from {}", location);
        let response = self.client.get(location).send().await.map_err(|e| {
            warn!("Failed to fetch subtitle text from {}, {}", location, e);
            FetchError::Transport(e.to_string())
        })?;

        let status = response.status();
        trace!("Received status {} for {}", status, location);
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

/// The builder of the [HttpSubtitleFetcher].
#[derive(Debug, Default)]
pub struct HttpSubtitleFetcherBuilder {
    user_agent: Option<String>,
    insecure: bool,
}

impl HttpSubtitleFetcherBuilder {
    /// Apply the given subtitle properties to the builder.
    pub fn properties(mut self, properties: &SubtitleProperties) -> Self {
        self.user_agent = Some(properties.user_agent().to_string());
        self.insecure = properties.insecure();
        self
    }

    /// Set the user agent which is sent to the subtitle host.
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Accept invalid TLS certificates of the subtitle host.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Build the fetcher instance.
    ///
    /// It returns a [FetchError::Transport] when the HTTP client couldn't be created.
    pub fn build(self) -> Result<HttpSubtitleFetcher, FetchError> {
        let mut default_headers = HeaderMap::new();
        if let Some(user_agent) = self.user_agent {
            let value = HeaderValue::from_str(user_agent.as_str())
                .map_err(|e| FetchError::Transport(format!("invalid user agent, {}", e)))?;
            default_headers.insert(USER_AGENT, value);
        }

        let client = ClientBuilder::new()
            .default_headers(default_headers)
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(HttpSubtitleFetcher { client })
    }
}
