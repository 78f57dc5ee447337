//! Diagnostics setup for the CLI.
//!
//! Build output meant for users goes through [`memo_bundler::Logger`]; this
//! module only configures `tracing` for the crate-internal diagnostics.
//!
//! ```rust,no_run
//! use memo_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::debug!("resolved 2 targets");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "memo_bundler=info,memo_cli=info";
const VERBOSE_FILTER: &str = "memo_bundler=debug,memo_cli=debug";
const QUIET_FILTER: &str = "memo_bundler=error,memo_cli=error";

/// Install the global subscriber.
///
/// Call once at startup. A second call keeps the first subscriber.
///
/// # Arguments
///
/// * `verbose` - Debug level for the memo crates (overrides `quiet`)
/// * `quiet` - Error level only
/// * `no_color` - Disable ANSI colors in diagnostics
///
/// # Verbosity Levels
///
/// 1. `--verbose`: debug
/// 2. `--quiet`: error
/// 3. `RUST_LOG`, when set
/// 4. otherwise info
///
/// # Examples
///
/// ```rust,no_run
/// use memo_cli::logger::init_logger;
///
/// // Quiet mode without colors, e.g. in CI
/// init_logger(false, true, true);
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Whether stderr should get colored output.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; with neither set the terminal decides.
///
/// # Examples
///
/// ```no_run
/// use memo_cli::logger::should_use_colors;
///
/// if !should_use_colors() {
///     println!("plain output");
/// }
/// ```
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_parse() {
        for filter in [DEFAULT_FILTER, VERBOSE_FILTER, QUIET_FILTER] {
            assert!(EnvFilter::try_new(filter).is_ok(), "{filter}");
        }
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logger(false, true, true);
        init_logger(true, false, true);
    }
}
