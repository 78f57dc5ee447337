//! Turning a [`ConfigLoader`] into fully merged per-target options.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::loader::ConfigLoader;
use crate::logger::{LogLevel, Logger, create_logger};
use crate::options::BuildOptions;
use crate::package::find_nearest_package_name;
use crate::preset::{DEFAULT_ENTRY, normalize_formats, resolve_preset, with_base_defaults};

/// Caller-side resolution settings.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Fallback working directory when a target does not set `cwd`
    pub cwd: Option<PathBuf>,
}

impl ResolveOptions {
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMeta {
    pub show_summary: bool,
    pub preset_label: &'static str,
}

/// One target, ready to hand to a bundler.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Merged options with memo-only fields stripped and `cwd` filled in
    pub options: BuildOptions,
    pub cwd: PathBuf,
    pub log_level: LogLevel,
    pub logger: Arc<dyn Logger>,
    pub meta: ResolvedMeta,
}

/// Resolve every target produced by `loader`, in declaration order.
pub async fn resolve_configs(
    loader: &ConfigLoader,
    opts: &ResolveOptions,
) -> Result<Vec<ResolvedConfig>> {
    let config = loader.resolve().await?;
    config
        .into_targets()
        .iter()
        .map(|target| normalize_options(target, opts))
        .collect()
}

/// Normalize a single target.
pub fn normalize_options(explicit: &BuildOptions, opts: &ResolveOptions) -> Result<ResolvedConfig> {
    let preset = resolve_preset(explicit.preset.as_deref());

    let cwd = match explicit.cwd.clone().or_else(|| opts.cwd.clone()) {
        Some(cwd) => cwd,
        None => std::env::current_dir()?,
    };

    let name = explicit
        .name
        .clone()
        .or_else(|| find_nearest_package_name(&cwd));

    let mut options = BuildOptions::overlay(&with_base_defaults(&preset.defaults), explicit);
    options.format = Some(normalize_formats(options.format.take()));
    if options.entry.as_ref().is_none_or(|e| e.is_empty()) {
        options.entry = Some(vec![DEFAULT_ENTRY.to_string()]);
    }

    let log_level = options.log_level.unwrap_or_default();
    options.log_level = Some(log_level);
    options.name = name;
    options.cwd = Some(cwd.clone());

    let meta = ResolvedMeta {
        show_summary: options.show_summary.unwrap_or(true),
        preset_label: preset.label,
    };
    options.preset = None;
    options.show_summary = None;

    let logger = match &options.custom_logger {
        Some(logger) => Arc::clone(logger),
        None => {
            let logger = create_logger(options.name.as_deref(), log_level);
            options.custom_logger = Some(Arc::clone(&logger));
            logger
        }
    };

    tracing::trace!("normalized target '{}': {:?}", preset.label, options);

    Ok(ResolvedConfig {
        options,
        cwd,
        log_level,
        logger,
        meta,
    })
}

/// One-line description of a target for debug output.
pub fn format_target_summary(options: &BuildOptions) -> String {
    let platform = options
        .platform
        .map(|p| format!("{:?}", p).to_lowercase())
        .unwrap_or_else(|| "default".to_string());
    let entries = options
        .entry
        .as_ref()
        .map(|e| e.join(", "))
        .unwrap_or_else(|| DEFAULT_ENTRY.to_string());

    format!(
        "platform: {}, formats: {}, entry: {}",
        platform,
        options.format_label(),
        entries
    )
}
