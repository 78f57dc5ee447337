//! External JavaScript tooling used to turn config source into data.
//!
//! TypeScript configs are compiled with `esbuild` into a single ESM module and
//! then evaluated by `node`. Both steps sit behind traits so the loader can be
//! exercised without a JavaScript toolchain installed.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::process::Command;

use crate::error::{ConfigError, Result};

/// Binaries and modules the toolchain shells out to.
///
/// Every field can be overridden with a `MEMO_BUNDLER_*` environment
/// variable, e.g. `MEMO_BUNDLER_NODE=/opt/node/bin/node`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainSettings {
    /// Node.js executable
    pub node: String,
    /// esbuild executable
    pub esbuild: String,
    /// Module exposing `build(options)`
    pub bundler_module: String,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            node: "node".to_string(),
            esbuild: "esbuild".to_string(),
            bundler_module: "tsdown".to_string(),
        }
    }
}

impl ToolchainSettings {
    pub const ENV_PREFIX: &'static str = "MEMO_BUNDLER_";

    /// Defaults overlaid with `MEMO_BUNDLER_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(Self::ENV_PREFIX))
    }
}

/// Compiles a config source file into one self-contained module.
#[async_trait]
pub trait ConfigCompiler: Send + Sync {
    /// Returns the compiled module text. Empty output is reported by the caller.
    async fn compile(&self, path: &Path) -> Result<String>;
}

/// Evaluates a module and returns its exported config as data.
#[async_trait]
pub trait ModuleEvaluator: Send + Sync {
    async fn evaluate(&self, module: &Path) -> Result<Value>;
}

/// `esbuild --bundle` with packages left external.
#[derive(Debug, Clone)]
pub struct EsbuildCompiler {
    program: String,
}

impl EsbuildCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ConfigCompiler for EsbuildCompiler {
    async fn compile(&self, path: &Path) -> Result<String> {
        tracing::debug!("compiling config {} with {}", path.display(), self.program);

        let output = Command::new(&self.program)
            .arg(path)
            .args([
                "--bundle",
                "--platform=node",
                "--target=node18",
                "--format=esm",
                "--packages=external",
                "--log-level=error",
            ])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ConfigError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConfigError::Compilation {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// Picks `default ?? config ?? module`, calls it if it is a function and
// prints the result as JSON. Functions nested inside the value are dropped.
const EVALUATE_SHIM: &str = r#"
import { pathToFileURL } from 'node:url';
const mod = await import(pathToFileURL(process.argv[1]).href);
let value = mod.default ?? mod.config ?? mod;
if (typeof value === 'function') value = await value();
process.stdout.write(JSON.stringify(value ?? null, (_key, v) => (typeof v === 'function' ? undefined : v)));
"#;

/// Imports a module with `node` and reads its exported config.
#[derive(Debug, Clone)]
pub struct NodeEvaluator {
    program: String,
}

impl NodeEvaluator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ModuleEvaluator for NodeEvaluator {
    async fn evaluate(&self, module: &Path) -> Result<Value> {
        tracing::debug!("evaluating config module {}", module.display());

        let output = Command::new(&self.program)
            .args(["--input-type=module", "-e", EVALUATE_SHIM])
            .arg(module)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ConfigError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConfigError::Evaluation {
                path: module.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| ConfigError::Parse {
            path: module.to_path_buf(),
            message: format!("config export is not serializable: {}", e),
        })
    }
}
