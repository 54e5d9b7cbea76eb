//! Collector module
//!
//! Owns the only shared mutable state of a harvest: the deduplicated
//! [`ResultSet`] and the failure log.

#[allow(clippy::module_inception)]
mod collector;
mod result_set;

pub use collector::{AbsorbOutcome, Collector};
pub use result_set::ResultSet;

#[cfg(test)]
mod tests;
