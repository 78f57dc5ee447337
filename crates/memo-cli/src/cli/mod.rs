//! Command-line interface definition.
//!
//! There are no subcommands: every flag describes the build to run. Values
//! given here override the config file field by field.

use std::path::PathBuf;

use clap::{Args, Parser};
use memo_bundler::{DEFAULT_CONFIG_FILE, Format, Platform};

/// memo-bundler - preset-driven library builds on top of tsdown
#[derive(Parser, Debug)]
#[command(
    name = "memo-bundler",
    version,
    about = "Preset-driven library builds on top of tsdown",
    long_about = "Loads memo-bundler.config.ts (or the file given with --config), merges it with\n\
                  the browser, node or universal preset and builds every target in order."
)]
pub struct Cli {
    /// Enable verbose diagnostics (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub build: BuildArgs,
}

/// Build flags. Unset flags leave the config file untouched.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Config file path; `false` or an empty value disables it
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Preset: browser, node or universal (unknown names are ignored)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Entry files (repeatable or comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub entry: Vec<String>,

    /// Output formats: es (esm), cjs, iife, umd
    #[arg(long, value_delimiter = ',')]
    pub format: Vec<Format>,

    /// Runtime targets, e.g. es2018,node18
    #[arg(long, value_delimiter = ',')]
    pub target: Vec<String>,

    /// Target platform: browser, node or neutral
    #[arg(long)]
    pub platform: Option<Platform>,

    /// true, false or a minify mode such as dce-only
    #[arg(long)]
    pub minify: Option<String>,

    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub sourcemap: Option<bool>,

    /// Output directory
    #[arg(long = "outDir", visible_alias = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Artifact name
    #[arg(long)]
    pub name: Option<String>,

    /// silent, error, warn or info
    #[arg(long = "logLevel", visible_alias = "log-level")]
    pub log_level: Option<String>,

    /// Watch mode: a flag, a path or a comma-separated list of paths
    #[arg(short, long, num_args = 0..=1, default_missing_value = "true")]
    pub watch: Option<String>,

    /// Emit type declarations
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub dts: Option<bool>,

    /// Clean the output directory first
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub clean: Option<bool>,

    /// Print a size report
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub report: Option<bool>,

    /// Print the completion summary
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub summary: Option<bool>,
}

impl BuildArgs {
    /// The requested config file, or `None` when disabled.
    pub fn config_path(&self) -> Option<PathBuf> {
        match self.config.trim() {
            "" | "false" => None,
            path => Some(PathBuf::from(path)),
        }
    }
}
