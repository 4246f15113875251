//! fund-temp CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fund_temp::cli::{self, Cli, Commands};
use fund_temp::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so stdout stays clean for reports)
    let default_filter = if cli.verbose {
        "fund_temp=debug"
    } else {
        "fund_temp=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::debug!("Configuration loaded");

    match cli.command.unwrap_or_else(Commands::default_run) {
        Commands::Run { low, high, format } => cli::run_pipeline(config, low, high, format).await,
        Commands::Temps { format } => cli::run_temps(config, format).await,
        Commands::Funds { format } => cli::run_funds(config, format).await,
        Commands::Companies { min_scale, format } => {
            cli::run_companies(config, min_scale, format).await
        }
        Commands::Gauges { format } => cli::run_gauges(config, format).await,
    }
}
