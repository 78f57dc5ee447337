//! Status lines printed to stderr.

use owo_colors::{OwoColorize, Stream};

/// Print a success line to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use memo_cli::ui::success;
///
/// success("Bundle complete");
/// ```
pub fn success(message: &str) {
    eprintln!(
        "{} {}",
        "✓".if_supports_color(Stream::Stderr, |t| t.green().bold().to_string()),
        message
    );
}

/// Print an info line to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use memo_cli::ui::info;
///
/// info("Using config memo-bundler.config.ts");
/// ```
pub fn info(message: &str) {
    eprintln!(
        "{} {}",
        "ℹ".if_supports_color(Stream::Stderr, |t| t.blue().bold().to_string()),
        message
    );
}

/// Print a yellow warning line to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use memo_cli::ui::warning;
///
/// warning("Config file not found, using CLI arguments only");
/// ```
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        "⚠".if_supports_color(Stream::Stderr, |t| t.yellow().bold().to_string()),
        message.if_supports_color(Stream::Stderr, |t| t.yellow())
    );
}

/// Print a red failure line to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use memo_cli::ui::error;
///
/// error("Bundle failed: entry not found");
/// ```
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "✗".if_supports_color(Stream::Stderr, |t| t.red().bold().to_string()),
        message.if_supports_color(Stream::Stderr, |t| t.red())
    );
}
