use std::sync::Arc;

use clap::{Parser, Subcommand};
use dexscan::config::Config;
use dexscan::db_service::OpportunityStats;
use dexscan::scanner::ScanOutcome;
use dexscan::utils::app_context::AppContext;
use dexscan::utils::logger::setup_logger;
use dexscan::utils::shutdown;
use eyre::{bail, Result};
use log::info;
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan periodically until Ctrl-C (default)
    Start,
    /// Run a single scan and print what it found
    Scan,
    /// Print recent direct opportunities
    Opportunities {
        /// Maximum number of records
        #[arg(long, default_value_t = 50)]
        limit: i64,
        /// Only profitable records
        #[arg(long)]
        profitable: bool,
    },
    /// Print recent triangular opportunities
    Triangular {
        /// Maximum number of records
        #[arg(long, default_value_t = 50)]
        limit: i64,
        /// Only profitable records
        #[arg(long)]
        profitable: bool,
    },
    /// Print statistics over recent direct opportunities
    Stats,
    /// Print a summary of the loaded configuration
    Config,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn start(ctx: AppContext) -> Result<()> {
    ctx.ensure_primary_endpoint()?;

    let (trigger, shutdown) = shutdown::channel();
    let scanner = Arc::new(ctx.scanner(shutdown.clone()));
    let scanner_task = tokio::spawn(scanner.run(ctx.config.scan_interval, shutdown));

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, cancelling pending reads...");
    trigger.trigger();
    scanner_task.await?;
    Ok(())
}

async fn scan_once(ctx: AppContext) -> Result<()> {
    ctx.ensure_primary_endpoint()?;

    let scanner = ctx.scanner(shutdown::Shutdown::never());
    match scanner.start_scan().await {
        ScanOutcome::Completed(summary) => print_json(&serde_json::json!({
            "scan": summary.scan,
            "blockNumber": summary.block_number,
            "totalOpportunities": summary.total(),
            "profitableOpportunities": summary.profitable(),
            "triangularFailed": summary.triangular_failed,
            "elapsedMs": summary.elapsed.as_millis(),
            "direct": summary.direct,
            "triangular": summary.triangular,
        })),
        ScanOutcome::Failed => bail!("Scan failed, {} is unreachable", ctx.config.primary_network),
        ScanOutcome::Skipped => bail!("Scan already in progress"),
        ScanOutcome::Cancelled => bail!("Scan cancelled by shutdown"),
    }
}

fn print_config(config: &Config) -> Result<()> {
    let mut networks: Vec<String> = config.rpc_urls.keys().map(ToString::to_string).collect();
    networks.sort();

    print_json(&serde_json::json!({
        "venueCount": config.venues.len(),
        "configuredNetworks": networks,
        "primaryNetwork": config.primary_network,
        "pairs": config.pairs.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "scanIntervalSeconds": config.scan_interval.as_secs(),
        "minProfitThreshold": config.min_profit_threshold,
        "tradeAmount": config.trade_amount,
        "databaseConfigured": config.database_url.is_some(),
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger()?;

    let cli = Cli::parse();
    let config = Config::from_env()?;

    if let Some(Commands::Config) = cli.command {
        return print_config(&config);
    }

    let ctx = AppContext::new(config)?;

    match cli.command {
        Some(Commands::Scan) => scan_once(ctx).await,
        Some(Commands::Opportunities { limit, profitable }) => {
            print_json(&ctx.store.recent_direct(limit, profitable).await?)
        }
        Some(Commands::Triangular { limit, profitable }) => {
            print_json(&ctx.store.recent_triangular(limit, profitable).await?)
        }
        Some(Commands::Stats) => print_json(
            &OpportunityStats::collect(ctx.store.as_ref(), OpportunityStats::DEFAULT_WINDOW)
                .await?,
        ),
        Some(Commands::Start | Commands::Config) | None => start(ctx).await,
    }
}
