//! Terminal output helpers.

mod messages;

pub use messages::{error, info, success, warning};

use crate::logger::should_use_colors;

/// Decide once whether colored status output is allowed.
///
/// `--no-color` and `NO_COLOR` switch colors off for every `owo-colors`
/// user in the process, including the build logger.
///
/// # Arguments
///
/// * `no_color` - Value of the `--no-color` flag
///
/// # Examples
///
/// ```no_run
/// use memo_cli::ui::{init_colors, success};
///
/// init_colors(true);
/// success("printed without escape codes");
/// ```
pub fn init_colors(no_color: bool) {
    if no_color || !should_use_colors() {
        owo_colors::set_override(false);
    } else if std::env::var_os("FORCE_COLOR").is_some() {
        owo_colors::set_override(true);
    }
}
