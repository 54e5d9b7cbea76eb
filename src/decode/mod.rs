//! Page decoder module
//!
//! Turns a response body into a [`Page`](crate::pagination::Page).
//!
//! # Overview
//!
//! Each page carries exactly one record. The decoder locates the record id
//! and the next continuation token by dot path, checks that the required
//! fields are present, and keeps the whole object as the record.

mod decoder;

pub use decoder::{extract_path, extract_string, PageDecoder};
