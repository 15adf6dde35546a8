use clap::Parser;
use color_eyre::eyre::Result;
use std::io::stderr;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

mod cmd;

use cmd::serve::ServeArgs;

/// Redfish ComputerSystem facade over pluggable power backends
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,

    /// Verbose output - shows more detailed logs
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // RUST_LOG wins; otherwise our crates at info (debug with --verbose)
    let level = if cli.verbose { "debug" } else { "info" };
    let default_directives = format!(
        "bmc_shim={level},bmc_shim_server={level},bmc_shim_backend={level},tower_http={level},hyper=warn,reqwest=warn,rustls=warn"
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    registry().with(filter).with(fmt::layer().with_writer(stderr)).init();
    debug!("logger initialized");

    if let Err(e) = cmd::serve::run_serve(cli.serve).await {
        error!("bmc-shim failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
