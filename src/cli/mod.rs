//! CLI module
//!
//! Command-line interface for the pagination service.
//!
//! # Commands
//!
//! - `serve` - Start HTTP server mode
//! - `fetch` - Fetch one page from the configured source
//! - `validate` - Check the configuration

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, AppState};
