//! The value a config source produces: a config, or a function producing one.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::options::BuildOptions;

/// A single target or a multi-target list.
///
/// Arrays become [`BuildConfig::Multiple`], anything else is read as a single
/// target. Field errors are reported as-is, e.g. `unknown output format 'amd'`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BuildConfig {
    Multiple(Vec<BuildOptions>),
    Single(BuildOptions),
}

impl BuildConfig {
    /// Read a config value, dispatching on its JSON shape.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::Array(_) => serde_json::from_value(value).map(BuildConfig::Multiple),
            other => serde_json::from_value(other).map(BuildConfig::Single),
        }
    }

    /// Flatten into the list of targets, in declaration order.
    pub fn into_targets(self) -> Vec<BuildOptions> {
        match self {
            BuildConfig::Single(options) => vec![options],
            BuildConfig::Multiple(list) => list,
        }
    }

    /// Apply `overrides` on top of every target.
    pub fn with_overrides(&self, overrides: &BuildOptions) -> BuildConfig {
        match self {
            BuildConfig::Single(options) => {
                BuildConfig::Single(BuildOptions::overlay(options, overrides))
            }
            BuildConfig::Multiple(list) => BuildConfig::Multiple(
                list.iter()
                    .map(|options| BuildOptions::overlay(options, overrides))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for BuildConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        BuildConfig::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl From<BuildOptions> for BuildConfig {
    fn from(options: BuildOptions) -> Self {
        BuildConfig::Single(options)
    }
}

impl From<Vec<BuildOptions>> for BuildConfig {
    fn from(list: Vec<BuildOptions>) -> Self {
        BuildConfig::Multiple(list)
    }
}

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Deferred config producer. Invoked once per resolution.
pub type ConfigFn = Arc<dyn Fn() -> BoxFuture<Result<BuildConfig>> + Send + Sync>;

/// Config value or a (possibly async) function producing one.
#[derive(Clone)]
pub enum ConfigLoader {
    Static(BuildConfig),
    Deferred(ConfigFn),
}

impl ConfigLoader {
    /// Wrap a synchronous producer.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> BuildConfig + Send + Sync + 'static,
    {
        ConfigLoader::Deferred(Arc::new(move || -> BoxFuture<Result<BuildConfig>> {
            let config = f();
            Box::pin(async move { Ok(config) })
        }))
    }

    /// Wrap an async producer.
    ///
    /// ```
    /// use memo_bundler::{BuildConfig, BuildOptions, ConfigLoader};
    ///
    /// let loader = ConfigLoader::from_async_fn(|| async {
    ///     Ok(BuildConfig::Single(BuildOptions::default()))
    /// });
    /// # let _ = loader;
    /// ```
    pub fn from_async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BuildConfig>> + Send + 'static,
    {
        ConfigLoader::Deferred(Arc::new(move || -> BoxFuture<Result<BuildConfig>> {
            Box::pin(f())
        }))
    }

    /// Produce the underlying config, invoking the function if needed.
    pub async fn resolve(&self) -> Result<BuildConfig> {
        match self {
            ConfigLoader::Static(config) => Ok(config.clone()),
            ConfigLoader::Deferred(f) => f().await,
        }
    }

    /// Layer field-level overrides on top of whatever this loader produces.
    ///
    /// Deferred loaders stay deferred; the overrides are applied after the
    /// function runs. An empty override set returns the loader unchanged.
    pub fn with_overrides(self, overrides: BuildOptions) -> ConfigLoader {
        if overrides.is_empty() {
            return self;
        }

        match self {
            ConfigLoader::Static(config) => ConfigLoader::Static(config.with_overrides(&overrides)),
            ConfigLoader::Deferred(f) => {
                let overrides = Arc::new(overrides);
                ConfigLoader::Deferred(Arc::new(move || -> BoxFuture<Result<BuildConfig>> {
                    let f = Arc::clone(&f);
                    let overrides = Arc::clone(&overrides);
                    Box::pin(async move { Ok(f().await?.with_overrides(&overrides)) })
                }))
            }
        }
    }

    /// Combine an optional file loader with CLI overrides.
    ///
    /// Without a file loader the overrides become the whole config.
    pub fn merge_optional(loader: Option<ConfigLoader>, overrides: BuildOptions) -> ConfigLoader {
        match loader {
            Some(loader) => loader.with_overrides(overrides),
            None => ConfigLoader::Static(BuildConfig::Single(overrides)),
        }
    }
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoader::Static(config) => f.debug_tuple("Static").field(config).finish(),
            ConfigLoader::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<BuildOptions> for ConfigLoader {
    fn from(options: BuildOptions) -> Self {
        ConfigLoader::Static(BuildConfig::Single(options))
    }
}

impl From<Vec<BuildOptions>> for ConfigLoader {
    fn from(list: Vec<BuildOptions>) -> Self {
        ConfigLoader::Static(BuildConfig::Multiple(list))
    }
}

impl From<BuildConfig> for ConfigLoader {
    fn from(config: BuildConfig) -> Self {
        ConfigLoader::Static(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Format, Minify};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn file_config() -> BuildOptions {
        BuildOptions {
            format: Some(vec![Format::Es]),
            minify: Some(Minify::Enabled(true)),
            ..Default::default()
        }
    }

    fn cli_overrides() -> BuildOptions {
        BuildOptions {
            format: Some(vec![Format::Cjs, Format::Es]),
            ..Default::default()
        }
    }

    #[test]
    fn arrays_deserialize_as_multiple() {
        let config: BuildConfig =
            serde_json::from_value(json!([{ "name": "a" }, { "name": "b" }])).unwrap();
        assert_eq!(config.into_targets().len(), 2);

        let config: BuildConfig = serde_json::from_value(json!({ "name": "a" })).unwrap();
        assert!(matches!(config, BuildConfig::Single(_)));
    }

    #[test]
    fn field_errors_survive_shape_dispatch() {
        let err = BuildConfig::from_value(json!({ "format": "amd" })).unwrap_err();
        assert!(err.to_string().contains("unknown output format 'amd'"), "{err}");

        let err = BuildConfig::from_value(json!([{ "platform": "deno" }])).unwrap_err();
        assert!(err.to_string().contains("unknown platform 'deno'"), "{err}");

        let err = serde_json::from_value::<BuildConfig>(json!([{ "format": ["es", "amd"] }]))
            .unwrap_err();
        assert!(err.to_string().contains("unknown output format 'amd'"), "{err}");
    }

    #[tokio::test]
    async fn cli_format_replaces_file_format_wholesale() {
        let loader = ConfigLoader::from(file_config()).with_overrides(cli_overrides());
        let targets = loader.resolve().await.unwrap().into_targets();
        assert_eq!(targets[0].format, Some(vec![Format::Cjs, Format::Es]));
        // untouched field survives
        assert_eq!(targets[0].minify, Some(Minify::Enabled(true)));
    }

    #[tokio::test]
    async fn overrides_apply_to_every_target() {
        let loader = ConfigLoader::from(vec![file_config(), BuildOptions::default()])
            .with_overrides(cli_overrides());
        let targets = loader.resolve().await.unwrap().into_targets();
        assert!(targets
            .iter()
            .all(|t| t.format == Some(vec![Format::Cjs, Format::Es])));
    }

    #[tokio::test]
    async fn deferred_loader_is_overridden_after_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = ConfigLoader::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            BuildConfig::Single(file_config())
        })
        .with_overrides(cli_overrides());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let targets = loader.resolve().await.unwrap().into_targets();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(targets[0].format, Some(vec![Format::Cjs, Format::Es]));
    }

    #[tokio::test]
    async fn empty_overrides_keep_loader() {
        let loader = ConfigLoader::from(file_config()).with_overrides(BuildOptions::default());
        let targets = loader.resolve().await.unwrap().into_targets();
        assert_eq!(targets[0].format, Some(vec![Format::Es]));
    }

    #[tokio::test]
    async fn missing_loader_uses_overrides_alone() {
        let loader = ConfigLoader::merge_optional(None, cli_overrides());
        let targets = loader.resolve().await.unwrap().into_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].format, Some(vec![Format::Cjs, Format::Es]));

        let loader = ConfigLoader::merge_optional(None, BuildOptions::default());
        assert!(loader.resolve().await.unwrap().into_targets()[0].is_empty());
    }
}
