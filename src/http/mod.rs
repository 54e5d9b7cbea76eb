//! HTTP transport module
//!
//! Provides the single-attempt page transport and its optional throttle.
//!
//! # Features
//!
//! - **Status classification**: "service busy" and network faults are
//!   retryable, everything else that is not a 2xx is fatal
//! - **Token encoding**: continuation tokens are form-url-encoded into the
//!   configured query parameter
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;

pub use client::{HttpTransport, Transport, TransportConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
