//! Config sources: where a [`ConfigLoader`] comes from.
//!
//! A [`StaticSource`] hands out a value built in Rust. A [`FileSource`] reads a
//! config file from disk; data formats are parsed directly while script
//! configs go through the [`ConfigCompiler`]/[`ModuleEvaluator`] pair.
//!
//! # Compiled configs
//!
//! For `ts`/`mts`/`cts`/`tsx` files the compiled module is written to a
//! uniquely named file inside a `.memo-bundler` directory next to the config,
//! so bare imports in the config resolve against the project's
//! `node_modules`. The temp file is removed when loading returns, whether it
//! succeeded or not.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::loader::{BuildConfig, ConfigLoader};
use crate::toolchain::{
    ConfigCompiler, EsbuildCompiler, ModuleEvaluator, NodeEvaluator, ToolchainSettings,
};

/// Directory (next to the config file) holding compiled config modules.
pub const CACHE_DIR_NAME: &str = ".memo-bundler";

/// Default config file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "memo-bundler.config.ts";

/// Something that can produce a [`ConfigLoader`].
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn load(&self) -> Result<ConfigLoader>;
}

/// Source backed by an in-memory loader.
#[derive(Debug, Clone)]
pub struct StaticSource {
    loader: ConfigLoader,
}

impl StaticSource {
    pub fn new(loader: impl Into<ConfigLoader>) -> Self {
        Self {
            loader: loader.into(),
        }
    }
}

#[async_trait]
impl ConfigSource for StaticSource {
    async fn load(&self) -> Result<ConfigLoader> {
        Ok(self.loader.clone())
    }
}

/// How a config file is turned into data, decided by extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFileKind {
    /// TypeScript: compile, then evaluate
    Compiled,
    /// Anything else a module runtime can import as-is
    Script,
    Json,
    Toml,
}

impl ConfigFileKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;

        Ok(match ext.as_str() {
            "ts" | "mts" | "cts" | "tsx" => ConfigFileKind::Compiled,
            "json" => ConfigFileKind::Json,
            "toml" => ConfigFileKind::Toml,
            _ => ConfigFileKind::Script,
        })
    }
}

/// Source reading a config file from disk.
pub struct FileSource {
    path: PathBuf,
    compiler: Arc<dyn ConfigCompiler>,
    evaluator: Arc<dyn ModuleEvaluator>,
}

impl FileSource {
    /// File source using the toolchain from [`ToolchainSettings`].
    pub fn new(path: impl Into<PathBuf>, settings: &ToolchainSettings) -> Self {
        Self::with_toolchain(
            path,
            Arc::new(EsbuildCompiler::new(&settings.esbuild)),
            Arc::new(NodeEvaluator::new(&settings.node)),
        )
    }

    pub fn with_toolchain(
        path: impl Into<PathBuf>,
        compiler: Arc<dyn ConfigCompiler>,
        evaluator: Arc<dyn ModuleEvaluator>,
    ) -> Self {
        Self {
            path: path.into(),
            compiler,
            evaluator,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_compiled(&self, path: &Path) -> Result<Value> {
        let code = self.compiler.compile(path).await?;
        if code.trim().is_empty() {
            return Err(ConfigError::EmptyCompileOutput(path.to_path_buf()));
        }

        let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let cache_dir = config_dir.join(CACHE_DIR_NAME);
        tokio::fs::create_dir_all(&cache_dir).await?;

        // NamedTempFile deletes the module on drop, including on the error paths below.
        let temp = temp_module(&cache_dir)?;
        tokio::fs::write(temp.path(), code.as_bytes()).await?;
        tracing::trace!("wrote compiled config to {}", temp.path().display());

        let value = self.evaluator.evaluate(temp.path()).await;
        if let Err(err) = temp.close() {
            tracing::warn!("failed to remove compiled config module: {}", err);
        }
        value
    }

    async fn load_script(&self, path: &Path) -> Result<Value> {
        self.evaluator.evaluate(path).await
    }

    async fn load_json(&self, path: &Path) -> Result<Value> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("Invalid JSON: {}", e),
        })
    }

    async fn load_toml(&self, path: &Path) -> Result<Value> {
        let content = tokio::fs::read_to_string(path).await?;
        let toml_val: toml::Table = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("Invalid TOML syntax: {}", e),
        })?;

        let mut value = serde_json::to_value(toml_val).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("TOML to JSON conversion failed: {}", e),
        })?;

        // `[[targets]]` tables describe a multi-target build
        if let Some(targets) = value.get_mut("targets").filter(|t| t.is_array()) {
            value = targets.take();
        }
        Ok(value)
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    async fn load(&self) -> Result<ConfigLoader> {
        let path = self.path.as_path();
        let kind = ConfigFileKind::from_path(path)?;
        tracing::debug!("loading {:?} config from {}", kind, path.display());

        let value = match kind {
            ConfigFileKind::Compiled => self.load_compiled(path).await?,
            ConfigFileKind::Script => self.load_script(path).await?,
            ConfigFileKind::Json => self.load_json(path).await?,
            ConfigFileKind::Toml => self.load_toml(path).await?,
        };

        if !(value.is_object() || value.is_array()) {
            return Err(ConfigError::InvalidValue(format!(
                "{} must export an options object or an array of them, got {}",
                path.display(),
                value
            )));
        }

        let config = BuildConfig::from_value(value).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(ConfigLoader::Static(config))
    }
}

/// Load a config file relative to the process working directory.
///
/// # Errors
///
/// - [`ConfigError::UnsupportedFormat`] when the path has no extension
/// - [`ConfigError::EmptyCompileOutput`] when compilation yields nothing
/// - compiler and evaluator failures are passed through as-is
pub async fn load_config_from_file(path: impl AsRef<Path>) -> Result<ConfigLoader> {
    let absolute = std::env::current_dir()?.join(path.as_ref());
    let settings = ToolchainSettings::load()?;
    FileSource::new(absolute, &settings).load().await
}

fn temp_module(cache_dir: &Path) -> Result<tempfile::NamedTempFile> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    Ok(tempfile::Builder::new()
        .prefix(&format!("config-{}-", millis))
        .suffix(".mjs")
        .rand_bytes(8)
        .tempfile_in(cache_dir)?)
}
