use clap::{Parser, Subcommand};
use sizewatch_core::AvailabilityMode;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sizewatch-cli")]
#[command(about = "Track which apparel sizes are purchasable on storefront product pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Probe every product in the product list and append today's rows.
    Run {
        /// How sizes are judged when other attributes must also be chosen.
        #[arg(long, default_value_t = AvailabilityMode::Union)]
        mode: AvailabilityMode,

        /// Print the daily rows instead of appending them; skip back-fill.
        #[arg(long)]
        dry_run: bool,

        /// Probe at most this many products.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Probe a single product URL and print the result.
    Probe {
        url: String,

        #[arg(long, default_value_t = AvailabilityMode::Union)]
        mode: AvailabilityMode,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the detected product-list layout and the URLs that would be probed.
    Products,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = sizewatch_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run {
            mode,
            dry_run,
            limit,
        } => commands::run_pass(&config, mode, dry_run, limit).await,
        Commands::Probe { url, mode, json } => {
            commands::probe_one(&config, &url, mode, json).await
        }
        Commands::Products => commands::list_products(&config),
    }
}
