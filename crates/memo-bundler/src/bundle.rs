//! Sequential build driver.
//!
//! Every resolved target is built to completion before the next one starts.
//! The first failing target stops the run: it is logged through the target's
//! logger and returned as [`BundleError::Build`].

use std::time::Instant;

use async_trait::async_trait;

use crate::builder::NodeBundler;
use crate::error::{BuildFailure, BundleError};
use crate::format::format_duration;
use crate::loader::ConfigLoader;
use crate::options::BuildOptions;
use crate::resolve::{ResolveOptions, ResolvedConfig, format_target_summary, resolve_configs};
use crate::toolchain::ToolchainSettings;

/// The underlying library bundler.
#[async_trait]
pub trait Bundler: Send + Sync {
    async fn build(&self, options: &BuildOptions) -> Result<(), BuildFailure>;
}

#[async_trait]
impl<B: Bundler + ?Sized> Bundler for std::sync::Arc<B> {
    async fn build(&self, options: &BuildOptions) -> Result<(), BuildFailure> {
        (**self).build(options).await
    }
}

/// Drives a [`Bundler`] over every target a loader produces.
#[derive(Debug, Clone)]
pub struct BundleDriver<B> {
    bundler: B,
}

impl<B: Bundler> BundleDriver<B> {
    pub fn new(bundler: B) -> Self {
        Self { bundler }
    }

    pub fn bundler(&self) -> &B {
        &self.bundler
    }

    /// Resolve `loader` and build each target in order.
    pub async fn run(&self, loader: &ConfigLoader, opts: &ResolveOptions) -> Result<(), BundleError> {
        let targets = resolve_configs(loader, opts).await?;
        tracing::debug!("resolved {} build target(s)", targets.len());

        for target in &targets {
            self.build_target(target).await?;
        }
        Ok(())
    }

    async fn build_target(&self, target: &ResolvedConfig) -> Result<(), BundleError> {
        let ResolvedConfig {
            options,
            logger,
            meta,
            ..
        } = target;

        logger.info(&format!(
            "Starting {} build, formats: {}",
            meta.preset_label,
            options.format_label()
        ));
        tracing::debug!("{}", format_target_summary(options));

        let start = Instant::now();
        match self.bundler.build(options).await {
            Ok(()) => {
                if meta.show_summary {
                    logger.success(&format!("Finished in {}", format_duration(start.elapsed())));
                }
                Ok(())
            }
            Err(source) => {
                logger.error(&source.to_string());
                Err(BundleError::Build {
                    target: meta.preset_label.to_string(),
                    source,
                })
            }
        }
    }
}

/// Build every target with the `node`-hosted bundler from toolchain settings.
pub async fn run_bundle(loader: &ConfigLoader, opts: &ResolveOptions) -> Result<(), BundleError> {
    let settings = ToolchainSettings::load()?;
    BundleDriver::new(NodeBundler::from_settings(&settings))
        .run(loader, opts)
        .await
}
