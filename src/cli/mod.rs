//! CLI module
//!
//! Command-line interface for harvesting a token chain.
//!
//! # Commands
//!
//! - `run` - Fetch every page, persist and report
//! - `report` - Report over a persisted file
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::{RunStatus, Runner};
