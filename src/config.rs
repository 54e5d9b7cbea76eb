//! Configuration types for a harvest run
//!
//! A run is described by a YAML file (JSON works too, being a YAML subset).
//! Every field has a default, so an empty file or no file at all yields the
//! stock configuration for the product endpoint.

use crate::error::{Error, Result, ResultExt};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete harvest configuration loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Endpoint and page shape
    pub source: SourceConfig,

    /// HTTP client configuration
    pub http: HttpConfig,

    /// Retry policy
    pub retry: RetryConfig,

    /// Worker pool
    pub engine: EngineConfig,

    /// Persisted output
    pub output: OutputConfig,

    /// Summary report
    pub report: ReportConfig,
}

impl HarvestConfig {
    /// Load a config from a YAML (or JSON) file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a config from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the config as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check the values a run cannot work without
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.base_url)
            .map_err(|e| Error::invalid_value("source.base_url", e.to_string()))?;

        for (field, value) in [
            ("source.token_param", &self.source.token_param),
            ("source.id_field", &self.source.id_field),
            ("source.token_field", &self.source.token_field),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_value(field, "must not be empty"));
            }
        }

        if self.engine.workers == 0 {
            return Err(Error::invalid_value("engine.workers", "must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::invalid_value(
                "retry.max_attempts",
                "must be at least 1",
            ));
        }
        if let Some(rate) = &self.http.rate_limit {
            if rate.requests_per_second == 0 {
                return Err(Error::invalid_value(
                    "http.rate_limit.requests_per_second",
                    "must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Source
// ============================================================================

/// Collection endpoint and the fields the engine relies on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Collection endpoint; the first page is fetched from it verbatim
    pub base_url: String,

    /// Query parameter carrying the continuation token
    pub token_param: String,

    /// Dot path of the record identifier in each page
    pub id_field: String,

    /// Dot path of the next continuation token in each page
    pub token_field: String,

    /// Fields every page must carry to be accepted
    pub required_fields: Vec<String>,

    /// Fields that must hold a JSON number whenever they are present
    pub numeric_fields: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://145.239.87.46:8000/product".to_string(),
            token_param: "next_product_token".to_string(),
            id_field: "product_id".to_string(),
            token_field: "next_product_token".to_string(),
            required_fields: vec![
                "product_name".to_string(),
                "category".to_string(),
                "price".to_string(),
            ],
            numeric_fields: vec!["price".to_string()],
        }
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Connection timeout in seconds
    pub connect_timeout_seconds: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// HTTP status codes treated as "service busy"
    pub retryable_statuses: Vec<u16>,

    /// Optional client-side throttle
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            user_agent: format!("chainfetch/{}", env!("CARGO_PKG_VERSION")),
            retryable_statuses: crate::error::DEFAULT_RETRYABLE_STATUSES.to_vec(),
            rate_limit: None,
        }
    }
}

impl HttpConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Connect timeout as a duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second
    pub requests_per_second: u32,

    /// Burst size
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_burst() -> u32 {
    1
}

// ============================================================================
// Retry
// ============================================================================

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per token, first try included
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds
    pub initial_backoff_ms: u64,

    /// How the delay grows between retries
    pub backoff: BackoffType,

    /// Upper bound on a single delay; unbounded when absent
    pub max_backoff_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 1000,
            backoff: BackoffType::Exponential,
            max_backoff_ms: None,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of simultaneously active fetch tasks
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { workers: 5 }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Persisted output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File receiving the JSON array of records
    pub path: PathBuf,

    /// Pretty-print the JSON
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("products.json"),
            pretty: true,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Summary report configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Record id field
    pub id_field: String,

    /// Record display name field
    pub name_field: String,

    /// Field grouping records into categories
    pub category_field: String,

    /// Numeric price field
    pub price_field: String,

    /// Category searched for its most expensive record
    pub max_price_category: String,

    /// Category whose mean price is reported
    pub average_price_category: String,

    /// Currency label printed next to the mean price
    pub currency: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            id_field: "product_id".to_string(),
            name_field: "product_name".to_string(),
            category_field: "category".to_string(),
            price_field: "price".to_string(),
            max_price_category: "Fashion".to_string(),
            average_price_category: "Toys & Games".to_string(),
            currency: "PLN".to_string(),
        }
    }
}
