//! CLI error type.
//!
//! Library errors are wrapped transparently so the terminal shows the
//! underlying diagnostic, e.g. the compiler's own message.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or parsing the config file failed
    #[error(transparent)]
    Config(#[from] memo_bundler::ConfigError),

    /// A target failed to build
    #[error(transparent)]
    Bundle(#[from] memo_bundler::BundleError),

    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;
