//! Retry module
//!
//! The only retry boundary in the crate. [`RetryPolicy`] wraps a
//! [`Transport`](crate::http::Transport) with a bounded attempt budget and a
//! backoff schedule (exponential by default: `d, 2d, 4d, ...`).

mod policy;

pub use policy::RetryPolicy;
