//! memo-bundler CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use memo_cli::{cli, commands, logger, ui};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    match commands::execute(&args.build, args.quiet).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("Bundle failed: {}", err));
            ExitCode::FAILURE
        }
    }
}
