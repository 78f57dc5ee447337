//! The bundle command: load the config, apply CLI overrides, build.

use std::path::Path;

use memo_bundler::{ConfigLoader, ResolveOptions, load_config_from_file, run_bundle};

use crate::cli::BuildArgs;
use crate::error::{CliError, Result};
use crate::overrides::options_from_args;
use crate::ui;

/// Run every configured target.
///
/// A missing config file is not fatal: the build continues with the CLI
/// flags alone. `quiet` hides the status lines but never the warning.
pub async fn execute(args: &BuildArgs, quiet: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let overrides = options_from_args(args);

    let file_loader = match args.config_path() {
        Some(path) => match load_file(&cwd, &path).await {
            Ok(loader) => {
                if !quiet {
                    ui::info(&format!("Using config {}", path.display()));
                }
                Some(loader)
            }
            Err(CliError::ConfigNotFound(missing)) => {
                ui::warning(&format!(
                    "Config file not found: {}, using CLI arguments only",
                    missing.display()
                ));
                None
            }
            Err(err) => return Err(err),
        },
        None => None,
    };

    let loader = ConfigLoader::merge_optional(file_loader, overrides);
    tracing::debug!("running bundle in {}", cwd.display());
    run_bundle(&loader, &ResolveOptions::with_cwd(cwd)).await?;
    if !quiet {
        ui::success("Bundle complete");
    }
    Ok(())
}

async fn load_file(cwd: &Path, path: &Path) -> Result<ConfigLoader> {
    let absolute = cwd.join(path);
    if !absolute.is_file() {
        return Err(CliError::ConfigNotFound(absolute));
    }
    tracing::debug!("loading config from {}", absolute.display());
    Ok(load_config_from_file(absolute).await?)
}
