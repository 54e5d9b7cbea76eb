//! Single-attempt HTTP transport
//!
//! Issues one GET per call and classifies the outcome:
//! - "service busy" statuses and network faults are retryable
//! - other non-success statuses and malformed pages are fatal
//! - a decodable 2xx body is a page
//!
//! Retrying is the caller's business; nothing here sleeps except the
//! optional rate limiter.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::config::{HarvestConfig, HttpConfig};
use crate::decode::PageDecoder;
use crate::error::{Error, Result, DEFAULT_RETRYABLE_STATUSES};
use crate::pagination::{FetchResult, Page};
use crate::types::{display_token, ContinuationToken};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Longest body excerpt kept in a failure reason
const BODY_EXCERPT_LIMIT: usize = 200;

/// Fetches one page of the collection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the page for `token`, or the first page when `token` is `None`
    async fn fetch(&self, token: Option<&ContinuationToken>) -> FetchResult;
}

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Collection endpoint
    pub base_url: Url,
    /// Query parameter carrying the continuation token
    pub token_param: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Statuses treated as "service busy"
    pub retryable_statuses: Vec<u16>,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
}

impl TransportConfig {
    /// Create a config for `base_url` with default settings
    pub fn new(base_url: &str) -> Result<Self> {
        let http = HttpConfig::default();
        Ok(Self {
            base_url: Url::parse(base_url)?,
            token_param: "next_product_token".to_string(),
            timeout: http.timeout(),
            connect_timeout: http.connect_timeout(),
            user_agent: http.user_agent,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
            rate_limit: None,
        })
    }

    /// Build the transport config from a harvest config
    pub fn from_harvest(config: &HarvestConfig) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(&config.source.base_url)?,
            token_param: config.source.token_param.clone(),
            timeout: config.http.timeout(),
            connect_timeout: config.http.connect_timeout(),
            user_agent: config.http.user_agent.clone(),
            retryable_statuses: config.http.retryable_statuses.clone(),
            rate_limit: config
                .http
                .rate_limit
                .as_ref()
                .map(|r| RateLimiterConfig::new(r.requests_per_second, r.burst_size)),
        })
    }

    /// Set the token query parameter
    #[must_use]
    pub fn with_token_param(mut self, param: impl Into<String>) -> Self {
        self.token_param = param.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retryable statuses
    #[must_use]
    pub fn with_retryable_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.retryable_statuses = statuses;
        self
    }

    /// Set rate limiter
    #[must_use]
    pub fn with_rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }
}

/// HTTP transport over reqwest
pub struct HttpTransport {
    client: Client,
    config: TransportConfig,
    decoder: PageDecoder,
    rate_limiter: Option<RateLimiter>,
}

impl HttpTransport {
    /// Create a transport with the default page decoder
    pub fn new(config: TransportConfig) -> Result<Self> {
        Self::with_decoder(config, PageDecoder::default())
    }

    /// Create a transport with a custom page decoder
    pub fn with_decoder(config: TransportConfig, decoder: PageDecoder) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            decoder,
            rate_limiter,
        })
    }

    /// Build the transport described by a harvest config
    pub fn from_harvest(config: &HarvestConfig) -> Result<Self> {
        Self::with_decoder(
            TransportConfig::from_harvest(config)?,
            PageDecoder::from_config(&config.source),
        )
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// URL for a token; the parameter is omitted for the first page
    pub fn page_url(&self, token: Option<&ContinuationToken>) -> Url {
        let mut url = self.config.base_url.clone();
        if let Some(token) = token {
            url.query_pairs_mut()
                .append_pair(&self.config.token_param, token.as_str());
        }
        url
    }

    /// One request, surfacing every problem as an [`Error`]
    async fn attempt(&self, token: Option<&ContinuationToken>) -> Result<Page> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let url = self.page_url(token);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), excerpt(&body)));
        }

        let body = response.text().await?;
        debug!("GET {} -> {}", url, status.as_u16());
        self.decoder.decode(&body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, token: Option<&ContinuationToken>) -> FetchResult {
        match self.attempt(token).await {
            Ok(page) => FetchResult::Success(page),
            Err(e) if e.is_retryable_for(&self.config.retryable_statuses) => {
                debug!("Retryable failure for {}: {e}", display_token(token));
                FetchResult::RetryableFailure(e.to_string())
            }
            Err(e) => FetchResult::FatalFailure(e.to_string()),
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Trim a response body for inclusion in a failure reason
fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= BODY_EXCERPT_LIMIT {
        return body.to_string();
    }
    let cut: String = body.chars().take(BODY_EXCERPT_LIMIT).collect();
    format!("{cut}...")
}
