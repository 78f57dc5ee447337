//! Named presets that seed platform, target and minification defaults.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::options::{BuildOptions, Format, Minify, Platform};

/// Built-in preset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Browser,
    Node,
    Universal,
}

impl Preset {
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Browser => "browser",
            Preset::Node => "node",
            Preset::Universal => "universal",
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "browser" => Ok(Preset::Browser),
            "node" => Ok(Preset::Node),
            "universal" => Ok(Preset::Universal),
            other => Err(format!("unknown preset '{}'", other)),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable label plus the partial options a preset contributes.
#[derive(Debug)]
pub struct PresetDetail {
    pub preset: Preset,
    pub label: &'static str,
    pub defaults: BuildOptions,
}

/// Default entry applied by normalization when nothing else sets one.
pub const DEFAULT_ENTRY: &str = "./src/index.ts";

static BASE_DEFAULTS: Lazy<BuildOptions> = Lazy::new(|| BuildOptions {
    clean: Some(true),
    dts: Some(true),
    sourcemap: Some(false),
    report: Some(true),
    skip_node_modules_bundle: Some(true),
    format: Some(default_formats()),
    ..Default::default()
});

// Order matters: the first entry is the fallback.
static PRESETS: Lazy<[PresetDetail; 3]> = Lazy::new(|| {
    [
        PresetDetail {
            preset: Preset::Browser,
            label: "browser library",
            defaults: BuildOptions {
                platform: Some(Platform::Browser),
                target: Some(vec!["es2018".into(), "chrome80".into()]),
                minify: Some(Minify::Enabled(true)),
                ..Default::default()
            },
        },
        PresetDetail {
            preset: Preset::Node,
            label: "Node.js library",
            defaults: BuildOptions {
                platform: Some(Platform::Node),
                target: Some(vec!["node18".into()]),
                minify: Some(Minify::Enabled(false)),
                ..Default::default()
            },
        },
        PresetDetail {
            preset: Preset::Universal,
            label: "universal library",
            defaults: BuildOptions {
                platform: Some(Platform::Neutral),
                target: Some(vec!["es2018".into(), "node18".into()]),
                minify: Some(Minify::Mode("dce-only".into())),
                ..Default::default()
            },
        },
    ]
});

fn default_formats() -> Vec<Format> {
    vec![Format::Es, Format::Cjs]
}

/// Look up a preset by name.
///
/// Unknown or missing names fall back to the browser preset, which has the
/// widest compatibility.
///
/// ```
/// use memo_bundler::preset::{resolve_preset, Preset};
///
/// assert_eq!(resolve_preset(Some("node")).preset, Preset::Node);
/// assert_eq!(resolve_preset(Some("deno")).preset, Preset::Browser);
/// assert_eq!(resolve_preset(None).preset, Preset::Browser);
/// ```
pub fn resolve_preset(name: Option<&str>) -> &'static PresetDetail {
    let wanted = name.and_then(|n| n.parse::<Preset>().ok());
    PRESETS
        .iter()
        .find(|detail| Some(detail.preset) == wanted)
        .unwrap_or(&PRESETS[0])
}

/// Overlay preset defaults on the cross-preset base defaults.
///
/// The result always carries a non-empty `format` list.
pub fn with_base_defaults(preset_defaults: &BuildOptions) -> BuildOptions {
    let mut merged = BuildOptions::overlay(&BASE_DEFAULTS, preset_defaults);
    merged.format = Some(normalize_formats(merged.format.take()));
    merged
}

/// Empty or missing format lists become the base `[es, cjs]`.
pub(crate) fn normalize_formats(formats: Option<Vec<Format>>) -> Vec<Format> {
    match formats {
        Some(list) if !list.is_empty() => list,
        _ => default_formats(),
    }
}
