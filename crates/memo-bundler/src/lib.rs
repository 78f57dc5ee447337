//! Config resolution and build orchestration for `tsdown`-based libraries.
//!
//! A build starts from a [`ConfigLoader`], either built in Rust or loaded from
//! a config file with [`load_config_from_file`]. [`resolve_configs`] merges
//! every target with its preset defaults, and [`BundleDriver`] builds the
//! targets one after another.
//!
//! ```no_run
//! use memo_bundler::{BuildOptions, ConfigLoader, ResolveOptions, run_bundle};
//!
//! # async fn demo() -> Result<(), memo_bundler::BundleError> {
//! let loader = ConfigLoader::from(BuildOptions {
//!     preset: Some("node".into()),
//!     ..Default::default()
//! });
//! run_bundle(&loader, &ResolveOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod bundle;
pub mod error;
pub mod format;
pub mod loader;
pub mod logger;
pub mod options;
pub mod package;
pub mod preset;
pub mod resolve;
pub mod source;
pub mod toolchain;

// Re-export main types
pub use builder::NodeBundler;
pub use bundle::*;
pub use error::*;
pub use format::format_duration;
pub use loader::*;
pub use logger::{
    FriendlyLogger, LogKind, LogLevel, LogRecord, LogSink, Logger, MemorySink, TerminalSink,
    create_logger, format_message, normalize_log_level,
};
pub use options::*;
pub use package::find_nearest_package_name;
pub use preset::{DEFAULT_ENTRY, Preset, PresetDetail, resolve_preset, with_base_defaults};
pub use resolve::*;
pub use source::*;
pub use toolchain::*;
