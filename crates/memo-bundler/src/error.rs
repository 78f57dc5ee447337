//! Error types for config loading, normalization and bundling.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Failures while turning a config file into a [`ConfigLoader`](crate::ConfigLoader).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file has no extension, so its kind cannot be decided
    #[error("unrecognized config file: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The compiler succeeded but produced nothing
    #[error("failed to compile config file: {} (empty output)", .0.display())]
    EmptyCompileOutput(PathBuf),

    /// The compiler itself failed; `message` is its own diagnostic
    #[error("{message}")]
    Compilation { path: PathBuf, message: String },

    /// Evaluating the (compiled) module failed; `message` is the runtime's diagnostic
    #[error("{message}")]
    Evaluation { path: PathBuf, message: String },

    /// A toolchain binary could not be started
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The config value does not have the expected shape
    #[error("invalid config in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    /// Toolchain settings could not be extracted
    #[error("invalid toolchain settings: {0}")]
    Settings(#[from] Box<figment::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Settings(Box::new(err))
    }
}

/// Failures reported by a [`Bundler`](crate::Bundler) implementation.
#[derive(Debug, Error)]
pub enum BuildFailure {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bundler exited with {status}")]
    Exited { status: std::process::ExitStatus },

    #[error("failed to serialize build options: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the bundle driver.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A target failed; remaining targets were not attempted
    #[error("{source}")]
    Build {
        /// Preset label of the failed target
        target: String,
        #[source]
        source: BuildFailure,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_names_the_path() {
        let err = ConfigError::UnsupportedFormat(PathBuf::from("configs/memo"));
        assert!(err.to_string().contains("configs/memo"));
    }

    #[test]
    fn empty_output_names_the_path() {
        let err = ConfigError::EmptyCompileOutput(PathBuf::from("memo-bundler.config.ts"));
        let msg = err.to_string();
        assert!(msg.contains("memo-bundler.config.ts"));
        assert!(msg.contains("empty output"));
    }

    #[test]
    fn evaluation_error_is_not_rewrapped() {
        let err = ConfigError::Evaluation {
            path: PathBuf::from("a.mjs"),
            message: "SyntaxError: Unexpected token".into(),
        };
        assert_eq!(err.to_string(), "SyntaxError: Unexpected token");
    }

    #[test]
    fn build_error_displays_underlying_failure() {
        let err = BundleError::Build {
            target: "browser library".into(),
            source: BuildFailure::Other("entry not found".into()),
        };
        assert_eq!(err.to_string(), "entry not found");
    }
}
