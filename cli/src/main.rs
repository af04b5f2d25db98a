use clap::Parser;
use tracing_subscriber::EnvFilter;
use vpms_cli::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    vpms_cli::run(Cli::parse())
}
