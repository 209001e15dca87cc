//! Probe adapter executable.
//!
//! The host invokes it once per method call:
//!   adapterkit-probe <method> <input-pipe> <output-pipe>
//!
//! Logs go to stderr. Any error exits non-zero, which the host treats as a
//! failed invocation.

use std::path::PathBuf;

use adapterkit_pipe::PipePair;
use adapterkit_probe::{AdapterMethod, run};
use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adapterkit-probe")]
#[command(about = "Reference adapter that reports on the host it runs in")]
struct Args {
    /// Method the host is invoking
    #[arg(value_enum)]
    method: AdapterMethod,

    /// Pipe the host writes the adapter instance to
    input: PathBuf,

    /// Pipe the result is written to
    output: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("ADAPTERKIT_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    info!(method = %args.method, "adapter invoked");
    debug!(input = %args.input.display(), output = %args.output.display(), "pipes");
    run(args.method, &PipePair::new(args.input, args.output)).await?;
    info!(method = %args.method, "adapter finished");
    Ok(())
}
