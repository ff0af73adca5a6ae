//! `sumocli_delete_source` binary: back up a Sumo Logic source, then delete it.

use anyhow::Result;
use clap::Parser;
use sumocli::{cli::cli::Cli, instrumentation::tracing as instrumentation};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Guards flush buffered log lines when main returns
    let _guards = instrumentation::init_tracing(cli.verbose, cli.log_dir.as_deref())?;
    instrumentation::init_panic_handler();

    sumocli::cli::cli::run(cli).await
}
