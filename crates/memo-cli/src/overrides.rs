//! Translating CLI flags into field-level [`BuildOptions`] overrides.

use memo_bundler::{BuildOptions, LogLevel, Minify, Preset, Watch, split_list};

use crate::cli::BuildArgs;

/// Only flags that were actually given end up set in the result.
pub fn options_from_args(args: &BuildArgs) -> BuildOptions {
    BuildOptions {
        entry: non_empty(&args.entry),
        format: (!args.format.is_empty()).then(|| args.format.clone()),
        target: non_empty(&args.target),
        platform: args.platform,
        minify: args.minify.as_deref().map(Minify::parse),
        sourcemap: args.sourcemap,
        out_dir: args.out_dir.clone(),
        name: args.name.clone(),
        log_level: args
            .log_level
            .as_deref()
            .and_then(|level| level.parse::<LogLevel>().ok()),
        watch: args.watch.as_deref().map(Watch::parse),
        dts: args.dts,
        clean: args.clean,
        report: args.report,
        show_summary: args.summary,
        preset: args
            .preset
            .as_deref()
            .and_then(|name| name.parse::<Preset>().ok())
            .map(|preset| preset.as_str().to_string()),
        ..Default::default()
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    let items: Vec<String> = values.iter().flat_map(|v| split_list(v)).collect();
    (!items.is_empty()).then_some(items)
}
