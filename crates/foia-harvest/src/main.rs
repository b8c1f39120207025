//! Entry point for the `foia-harvest` binary.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use foia_harvest::schedule::run_periodically;
use foia_harvest::{ConfigOverrides, HarvestConfig, Harvester};

#[derive(Parser)]
#[command(
    name = "foia-harvest",
    about = "Download monthly reports from a FOIA reading room, named by report month",
    version
)]
struct Cli {
    /// Path to a JSON config file. Also reads FOIA_HARVEST_CONFIG.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the reports.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of listing pages to visit.
    #[arg(long)]
    pages: Option<u32>,

    /// Text a link must contain to be harvested.
    #[arg(long)]
    keyword: Option<String>,

    /// Listing page URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Stop at the first listing page without links.
    #[arg(long)]
    stop_on_empty_page: bool,

    /// Repeat the crawl every N seconds until Ctrl-C.
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            output_dir: self.output_dir.clone(),
            pages: self.pages,
            keyword: self.keyword.clone(),
            base_url: self.base_url.clone(),
            stop_on_empty_page: self.stop_on_empty_page,
            interval_secs: self.interval_secs,
        }
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let json = cli.json;
    let cfg = HarvestConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let cfg = cli.overrides().apply(cfg);
    let interval = cfg.interval_secs;

    let harvester = Harvester::new(cfg).context("invalid configuration")?;
    tracing::info!(
        "harvesting {} into {}",
        harvester.config().base_url,
        harvester.naming().output_dir().display()
    );

    match interval {
        Some(secs) => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("cannot listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await;
                }
            };
            run_periodically(&harvester, Duration::from_secs(secs.max(1)), shutdown).await;
        }
        None => {
            let summary = harvester.run().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
    }

    Ok(())
}
