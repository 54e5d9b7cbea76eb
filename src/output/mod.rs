//! Output module
//!
//! Persists the harvested records as a JSON array and reads them back for
//! offline reporting.
//!
//! # Overview
//!
//! - `JsonWriter` - Atomic (temp file + rename) writer
//! - `read_records` - Loads a previously persisted array

mod writer;

pub use writer::{read_records, JsonWriter, JsonWriterConfig};
