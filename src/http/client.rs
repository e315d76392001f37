//! Search client with rate-limit handling and a fixed error budget
//!
//! Provides the single request primitive used by retrieval:
//! - 429 responses sleep for the server-provided `retry_after` and retry
//!   without touching the error budget
//! - 200 responses are parsed into a `SearchPage`
//! - anything else consumes one unit of the error budget, then waits a
//!   fixed delay and retries until the budget is spent

use crate::error::{Error, Result};
use crate::types::{RateLimitBody, SearchPage};
use reqwest::header::{HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Default failure budget for a retrieval session
pub const DEFAULT_MAX_ERRORS: u32 = 5;

/// Default fixed delay between failed attempts
pub const DEFAULT_ERROR_DELAY: Duration = Duration::from_secs(5);

/// Wait used when a 429 carries neither a body nor a `Retry-After` header
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Configuration for the search client
#[derive(Clone)]
pub struct HttpClientConfig {
    /// Credential sent verbatim in the `authorization` header
    pub token: String,
    /// Request timeout
    pub timeout: Duration,
    /// Failures tolerated before giving up
    pub max_errors: u32,
    /// Fixed delay after a failure
    pub error_delay: Duration,
    /// Cap on consecutive rate-limit retries for one page (None = unbounded)
    pub max_rate_limit_retries: Option<u32>,
    /// Wait used when a 429 gives no usable hint
    pub default_retry_after: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            timeout: Duration::from_secs(30),
            max_errors: DEFAULT_MAX_ERRORS,
            error_delay: DEFAULT_ERROR_DELAY,
            max_rate_limit_retries: None,
            default_retry_after: DEFAULT_RETRY_AFTER,
            user_agent: format!("discord-search-archiver/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_errors", &self.max_errors)
            .field("error_delay", &self.error_delay)
            .field("max_rate_limit_retries", &self.max_rate_limit_retries)
            .field("default_retry_after", &self.default_retry_after)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for search client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the credential
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the failure budget
    pub fn max_errors(mut self, max_errors: u32) -> Self {
        self.config.max_errors = max_errors;
        self
    }

    /// Set the delay after a failure
    pub fn error_delay(mut self, delay: Duration) -> Self {
        self.config.error_delay = delay;
        self
    }

    /// Cap rate-limit retries per page
    pub fn max_rate_limit_retries(mut self, retries: Option<u32>) -> Self {
        self.config.max_rate_limit_retries = retries;
        self
    }

    /// Set the fallback rate-limit wait
    pub fn default_retry_after(mut self, wait: Duration) -> Self {
        self.config.default_retry_after = wait;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Search client
///
/// Holds the session's error counter; the budget spans every page of one
/// retrieval rather than resetting after a success.
pub struct SearchClient {
    client: Client,
    config: HttpClientConfig,
    auth: HeaderValue,
    errors: u32,
    attempts: u64,
    rate_limits: u64,
}

impl SearchClient {
    /// Create a client from config
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(Error::missing_field("token"));
        }

        let mut auth = HeaderValue::from_str(config.token.trim())
            .map_err(|e| Error::invalid_value("token", e.to_string()))?;
        auth.set_sensitive(true);

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            auth,
            errors: 0,
            attempts: 0,
            rate_limits: 0,
        })
    }

    /// Failures counted against the budget so far
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    /// HTTP requests sent, including retries
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Rate-limit responses received
    pub fn rate_limits(&self) -> u64 {
        self.rate_limits
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Fetch one page of search results
    pub async fn fetch_page(&mut self, url: &Url) -> Result<SearchPage> {
        let mut rate_limited: u32 = 0;

        loop {
            self.attempts += 1;
            debug!("GET {}", url);

            let result = self
                .client
                .get(url.clone())
                .header(AUTHORIZATION, self.auth.clone())
                .send()
                .await;

            let failure = match result {
                Ok(response) => match response.status() {
                    StatusCode::OK => match parse_page(response).await {
                        Ok(page) => return Ok(page),
                        Err(e) => e,
                    },
                    StatusCode::TOO_MANY_REQUESTS => {
                        self.rate_limits += 1;
                        rate_limited += 1;
                        let wait = self.retry_after(response).await;

                        if let Some(max) = self.config.max_rate_limit_retries {
                            if rate_limited > max {
                                return Err(Error::RateLimited {
                                    retry_after_seconds: wait.as_secs_f64(),
                                });
                            }
                        }

                        warn!("Rate limited, retrying in {:.3} seconds", wait.as_secs_f64());
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                    status => {
                        let body = response.text().await.unwrap_or_default();
                        Error::http_status(status.as_u16(), body)
                    }
                },
                Err(e) => Error::Http(e),
            };

            if !failure.is_retryable() {
                return Err(failure);
            }

            self.errors += 1;
            error!(
                "Error {}/{}: {}",
                self.errors, self.config.max_errors, failure
            );

            if self.errors >= self.config.max_errors {
                return Err(Error::MaxErrorsExceeded {
                    max_errors: self.config.max_errors,
                    last: failure.to_string(),
                });
            }

            tokio::time::sleep(self.config.error_delay).await;
        }
    }

    /// Read the wait duration from a 429 response
    ///
    /// Prefers the JSON body's `retry_after`, then the `Retry-After` header.
    async fn retry_after(&self, response: Response) -> Duration {
        let header = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<f64>().ok());

        let body = response
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str::<RateLimitBody>(&text).ok())
            .map(|b| b.retry_after);

        body.or(header)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(self.config.default_retry_after)
    }
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("config", &self.config)
            .field("errors", &self.errors)
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

async fn parse_page(response: Response) -> Result<SearchPage> {
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| Error::decode(format!("Invalid search response: {e}")))
}
