//! [`Bundler`] implementation that hands options to a JavaScript bundler
//! module running under `node`.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::bundle::Bundler;
use crate::error::BuildFailure;
use crate::options::BuildOptions;
use crate::toolchain::ToolchainSettings;

// argv[1] is the module specifier, argv[2] the serialized options.
const BUILD_SHIM: &str = r#"
const { build } = await import(process.argv[1]);
await build(JSON.parse(process.argv[2]));
"#;

/// Runs `build(options)` from the configured bundler module in a child
/// `node` process. Output is inherited so the bundler's own logs show up
/// as-is.
#[derive(Debug, Clone)]
pub struct NodeBundler {
    node: String,
    module: String,
}

impl NodeBundler {
    pub fn new(node: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            module: module.into(),
        }
    }

    pub fn from_settings(settings: &ToolchainSettings) -> Self {
        Self::new(&settings.node, &settings.bundler_module)
    }

    pub fn module(&self) -> &str {
        &self.module
    }
}

#[async_trait]
impl Bundler for NodeBundler {
    async fn build(&self, options: &BuildOptions) -> Result<(), BuildFailure> {
        let payload = serde_json::to_string(options)?;

        let mut command = Command::new(&self.node);
        command
            .args(["--input-type=module", "-e", BUILD_SHIM])
            .arg(&self.module)
            .arg(&payload)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &options.cwd {
            command.current_dir(cwd);
        }

        tracing::debug!("running {} build via {}", self.module, self.node);
        let status = command.status().await.map_err(|source| BuildFailure::Spawn {
            program: self.node.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(BuildFailure::Exited { status })
        }
    }
}
