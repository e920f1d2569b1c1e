//! # ecctl
//!
//! Command-line administration client for Elastic Cloud Enterprise.
//!
//! Provides commands for:
//! - Comments on platform resources
//! - Deployment Elasticsearch keystores, extensions, templates and traffic filters
//! - Platform proxy settings
//!
//! # Architecture
//!
//! Each command parses its flags, builds the parameters of one
//! [`ece_client`] call, and writes the response through [`OutputFormat`].
//! Settings are merged once from flags, environment and config file into a
//! [`Context`] that every command borrows.
//!
//! ```text
//! ┌─────────┐    Context     ┌────────────┐    HTTPS     ┌─────────┐
//! │  ecctl  │───────────────►│ ece-client │─────────────►│ ECE API │
//! └─────────┘                └────────────┘              └─────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format};
pub use config::Settings;
pub use context::Context;
pub use error::CliError;
pub use output::OutputFormat;
