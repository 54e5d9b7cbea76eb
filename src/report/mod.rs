//! Report module
//!
//! Summary statistics over harvested records: total count, count per
//! category, the most expensive record of one category and the mean price
//! of another. A pure function of its input; it works the same on a fresh
//! result set and on a previously persisted file.

mod analysis;

pub use analysis::{analyze, PricedRecord, Report};
