use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod fixture;
mod prompt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let fallback = if cli.verbose { "catsync=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .init();
    commands::run_command(cli).await
}
