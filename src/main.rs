use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod classify;
mod cli;
mod config;
mod dataset;
mod diff;
mod error;
mod fetch;
mod ingest;
mod model;
mod output;
mod refine;
mod resolve;
mod state;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing - only show logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("prweave=debug")
    } else {
        EnvFilter::new("prweave=warn")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Refine(args) => cli::refine::execute(args).await,
        Commands::Build(args) => cli::build::execute(args),
        Commands::Tasks(args) => cli::tasks::execute(args),
        Commands::Inspect(args) => cli::inspect::execute(args),
        Commands::Schema => cli::schema::execute(),
    }
}
