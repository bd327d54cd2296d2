//! `shore` command-line entry point.

use std::process::ExitCode;

use clap::Parser;

use shore_explorer::cli::{self, Cli};
use shore_explorer::logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Cli::parse();
    logging::init(args.json);
    cli::run(args).await
}
