//! CLI module
//!
//! Command-line interface for running searches.
//!
//! # Commands
//!
//! - `search` - Retrieve every message matching a query into a JSON-Lines archive
//! - `to-csv` - Convert an archive to CSV
//! - `snowflake` - Convert between snowflakes and timestamps

mod commands;
mod runner;

pub use commands::{Cli, Commands, SearchArgs};
pub use runner::Runner;
