mod commands;
mod input;
mod json;
mod opts;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::header::HeaderCommand;
use commands::merge::MergeArgs;
use commands::plan::PlanArgs;
use commands::reduce::ReduceArgs;
use commands::stream::StreamArgs;
use opts::GlobalOpts;

#[derive(Parser, Debug)]
#[command(name = "gconst", version, about = "Constant-defaulted record streams")]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode or decode the x-grpc-const header
    #[command(subcommand)]
    Header(HeaderCommand),

    /// Fill the empty fields of a record from a donor
    Merge(MergeArgs),

    /// Clear the fields of a record that equal a reference
    Reduce(ReduceArgs),

    /// Show the field plan built from a record
    Plan(PlanArgs),

    /// Send messages through a negotiated in-memory stream
    Stream(StreamArgs),
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let opts = &cli.opts;

    match &cli.command {
        Command::Header(cmd) => commands::header::cmd_header(opts, cmd),
        Command::Merge(args) => commands::merge::cmd_merge(opts, args),
        Command::Reduce(args) => commands::reduce::cmd_reduce(opts, args),
        Command::Plan(args) => commands::plan::cmd_plan(opts, args),
        Command::Stream(args) => commands::stream::cmd_stream(opts, args),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warn).
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
