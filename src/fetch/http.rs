//! HTTP(S) sources.
use std::time::Duration;
use url::Url;

use super::FetchError;

/// Blocking HTTP client with fixed timeouts.
#[derive(Debug)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    /// Create a client.
    ///
    /// `connect` bounds connection setup; `transfer` bounds the whole request
    /// including the body.
    #[must_use]
    pub fn new(connect: Duration, transfer: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(connect))
            .timeout_global(Some(transfer))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// Send a GET request and return the response body as a reader.
    ///
    /// Non-success status codes are errors.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the request fails.
    pub fn open(&self, url: &Url) -> Result<ureq::BodyReader<'static>, FetchError> {
        let response = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(|e| FetchError::Http {
                url: url.to_string(),
                source: Box::new(e),
            })?;
        tracing::debug!("GET {url}: {}", response.status());
        Ok(response.into_body().into_reader())
    }
}
