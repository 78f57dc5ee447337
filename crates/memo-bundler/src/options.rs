//! Build options model shared by config files, presets and the CLI.
//!
//! Every field is optional so the same type can describe a preset, a config
//! file entry, a set of CLI overrides or a fully merged target. Merging is done
//! with [`BuildOptions::overlay`], which never mutates its inputs.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::logger::{LogLevel, Logger, deserialize_lenient_level};

/// Output module format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Es,
    Cjs,
    Iife,
    Umd,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Es => "es",
            Format::Cjs => "cjs",
            Format::Iife => "iife",
            Format::Umd => "umd",
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" | "esm" | "module" => Ok(Format::Es),
            "cjs" | "commonjs" => Ok(Format::Cjs),
            "iife" => Ok(Format::Iife),
            "umd" => Ok(Format::Umd),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        from_str_value(deserializer)
    }
}

/// Target platform environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Browser,
    Node,
    Neutral,
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "browser" => Ok(Platform::Browser),
            "node" => Ok(Platform::Node),
            "neutral" => Ok(Platform::Neutral),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        from_str_value(deserializer)
    }
}

// Goes through `FromStr` so config files and CLI flags share one error text.
fn from_str_value<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Minification policy: on/off, or a named mode such as `"dce-only"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Minify {
    Enabled(bool),
    Mode(String),
}

impl Minify {
    /// `"true"`/`"false"` become booleans, anything else is a mode name.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => Minify::Enabled(true),
            "false" => Minify::Enabled(false),
            mode => Minify::Mode(mode.to_string()),
        }
    }
}

/// Watch mode: on/off, a single path, or a list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Watch {
    Enabled(bool),
    Path(String),
    Paths(Vec<String>),
}

impl Watch {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => Watch::Enabled(true),
            "false" => Watch::Enabled(false),
            list if list.contains(',') => Watch::Paths(split_list(list)),
            path => Watch::Path(path.to_string()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Watch::Enabled(false))
    }
}

/// Split a comma-separated list, trimming items and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Options for a single build target.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    /// Entry points (a single string is accepted in config files)
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<String>>,

    /// Output formats, in emission order
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub format: Option<Vec<Format>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    /// Runtime target tags such as `es2018` or `node18`
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<Minify>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    /// Artifact name, also used as the log prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_lenient_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub log_level: Option<LogLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<Watch>,

    /// Emit type declarations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dts: Option<bool>,

    /// Clean the output directory first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,

    /// Print a size report after the build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_node_modules_bundle: Option<bool>,

    /// Working directory for the build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Preset name (`browser`, `node`, `universal`); stripped before building
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Print the completion summary; stripped before building
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_summary: Option<bool>,

    /// Logger to use instead of a freshly created one
    #[serde(skip)]
    pub custom_logger: Option<Arc<dyn Logger>>,

    /// Bundler options this crate does not model, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new value where every field set in `top` replaces the one in
    /// `base`. Lists are replaced wholesale, never merged element-wise.
    ///
    /// ```
    /// use memo_bundler::{BuildOptions, Format};
    ///
    /// let file = BuildOptions { format: Some(vec![Format::Es]), ..Default::default() };
    /// let cli = BuildOptions { format: Some(vec![Format::Cjs, Format::Es]), ..Default::default() };
    /// let merged = BuildOptions::overlay(&file, &cli);
    /// assert_eq!(merged.format, Some(vec![Format::Cjs, Format::Es]));
    /// ```
    pub fn overlay(base: &BuildOptions, top: &BuildOptions) -> BuildOptions {
        let mut extra = base.extra.clone();
        for (key, value) in &top.extra {
            extra.insert(key.clone(), value.clone());
        }

        BuildOptions {
            entry: top.entry.clone().or_else(|| base.entry.clone()),
            format: top.format.clone().or_else(|| base.format.clone()),
            platform: top.platform.or(base.platform),
            target: top.target.clone().or_else(|| base.target.clone()),
            minify: top.minify.clone().or_else(|| base.minify.clone()),
            sourcemap: top.sourcemap.or(base.sourcemap),
            out_dir: top.out_dir.clone().or_else(|| base.out_dir.clone()),
            name: top.name.clone().or_else(|| base.name.clone()),
            log_level: top.log_level.or(base.log_level),
            watch: top.watch.clone().or_else(|| base.watch.clone()),
            dts: top.dts.or(base.dts),
            clean: top.clean.or(base.clean),
            report: top.report.or(base.report),
            skip_node_modules_bundle: top.skip_node_modules_bundle.or(base.skip_node_modules_bundle),
            cwd: top.cwd.clone().or_else(|| base.cwd.clone()),
            preset: top.preset.clone().or_else(|| base.preset.clone()),
            show_summary: top.show_summary.or(base.show_summary),
            custom_logger: top
                .custom_logger
                .clone()
                .or_else(|| base.custom_logger.clone()),
            extra,
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
            && self.format.is_none()
            && self.platform.is_none()
            && self.target.is_none()
            && self.minify.is_none()
            && self.sourcemap.is_none()
            && self.out_dir.is_none()
            && self.name.is_none()
            && self.log_level.is_none()
            && self.watch.is_none()
            && self.dts.is_none()
            && self.clean.is_none()
            && self.report.is_none()
            && self.skip_node_modules_bundle.is_none()
            && self.cwd.is_none()
            && self.preset.is_none()
            && self.show_summary.is_none()
            && self.custom_logger.is_none()
            && self.extra.is_empty()
    }

    /// Formats joined for display, e.g. `"es, cjs"`.
    pub fn format_label(&self) -> String {
        match &self.format {
            Some(formats) if !formats.is_empty() => formats
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            _ => "default".to_string(),
        }
    }
}

impl fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("entry", &self.entry)
            .field("format", &self.format)
            .field("platform", &self.platform)
            .field("target", &self.target)
            .field("minify", &self.minify)
            .field("sourcemap", &self.sourcemap)
            .field("out_dir", &self.out_dir)
            .field("name", &self.name)
            .field("log_level", &self.log_level)
            .field("watch", &self.watch)
            .field("dts", &self.dts)
            .field("clean", &self.clean)
            .field("report", &self.report)
            .field("cwd", &self.cwd)
            .field("preset", &self.preset)
            .field("show_summary", &self.show_summary)
            .field("custom_logger", &self.custom_logger.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}

// Dispatches on the JSON shape itself so element errors keep their message.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(single) => vec![single],
    };
    items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_and_single_values() {
        let options: BuildOptions = serde_json::from_value(json!({
            "entry": "src/main.ts",
            "format": "esm",
            "outDir": "lib",
            "minify": "dce-only",
            "logLevel": "warn",
            "showSummary": false,
            "tsconfig": "./tsconfig.build.json"
        }))
        .unwrap();

        assert_eq!(options.entry, Some(vec!["src/main.ts".to_string()]));
        assert_eq!(options.format, Some(vec![Format::Es]));
        assert_eq!(options.out_dir, Some(PathBuf::from("lib")));
        assert_eq!(options.minify, Some(Minify::Mode("dce-only".into())));
        assert_eq!(options.log_level, Some(LogLevel::Warn));
        assert_eq!(options.show_summary, Some(false));
        assert_eq!(options.extra["tsconfig"], json!("./tsconfig.build.json"));
    }

    #[test]
    fn unknown_log_level_is_dropped() {
        let options: BuildOptions =
            serde_json::from_value(json!({ "logLevel": "verbose" })).unwrap();
        assert_eq!(options.log_level, None);
    }

    #[test]
    fn serializes_without_unset_fields_or_logger() {
        let options = BuildOptions {
            entry: Some(vec!["src/index.ts".into()]),
            format: Some(vec![Format::Es, Format::Cjs]),
            custom_logger: Some(crate::logger::create_logger(None, LogLevel::Info)),
            ..Default::default()
        };
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value, json!({ "entry": ["src/index.ts"], "format": ["es", "cjs"] }));
    }

    #[test]
    fn overlay_prefers_top_and_keeps_base() {
        let base = BuildOptions {
            entry: Some(vec!["a.ts".into()]),
            minify: Some(Minify::Enabled(true)),
            ..Default::default()
        };
        let top = BuildOptions {
            minify: Some(Minify::Enabled(false)),
            ..Default::default()
        };
        let merged = BuildOptions::overlay(&base, &top);
        assert_eq!(merged.entry, Some(vec!["a.ts".to_string()]));
        assert_eq!(merged.minify, Some(Minify::Enabled(false)));
        // inputs untouched
        assert_eq!(base.minify, Some(Minify::Enabled(true)));
    }

    #[test]
    fn watch_parsing() {
        assert_eq!(Watch::parse("true"), Watch::Enabled(true));
        assert_eq!(Watch::parse("src"), Watch::Path("src".into()));
        assert_eq!(
            Watch::parse("src, lib"),
            Watch::Paths(vec!["src".into(), "lib".into()])
        );
        assert!(!Watch::Enabled(false).is_enabled());
    }

    #[test]
    fn empty_options() {
        assert!(BuildOptions::new().is_empty());
        let named = BuildOptions {
            name: Some("x".into()),
            ..Default::default()
        };
        assert!(!named.is_empty());
    }
}
