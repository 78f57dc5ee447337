//! Command-line front end for `memo-bundler`.
//!
//! - [`cli`] - clap definitions
//! - [`overrides`] - flags to [`memo_bundler::BuildOptions`]
//! - [`commands`] - the bundle command
//! - [`logger`] - tracing setup
//! - [`ui`] - colored status lines

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod overrides;
pub mod ui;

pub use error::{CliError, Result};
