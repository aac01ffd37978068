mod config;
mod error;
mod loader;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::loader::{load_dataset, summarise, PricedSuburb};
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "suburb-price-scraper", about = "Suburb median home price rankings to CSV", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every ranking page and write the CSV (default)
    Scrape {
        /// Output CSV path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of pages to request (overrides config)
        #[arg(short, long)]
        pages: Option<u32>,
    },

    /// Summarise a previously written CSV
    Summary {
        /// CSV to read (default: configured output path)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "suburb_price_scraper=info,warn",
        1 => "suburb_price_scraper=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command.unwrap_or(Command::Scrape { output: None, pages: None }) {
        Command::Scrape { output, pages } => {
            if let Some(output) = output {
                config.output.path = output;
            }
            if let Some(pages) = pages {
                config.scraper.page_count = pages;
            }

            let _t = utils::Timer::start("Ranking scrape");
            let stats = Pipeline::new(config).run().await?;
            info!(
                "Done: {} pages, {} rows, {} skipped",
                stats.pages_ok, stats.rows, stats.pages_skipped
            );
        }

        Command::Summary { path } => {
            let path = path.unwrap_or(config.output.path);
            let data = load_dataset(&path)?;

            let summary = summarise(&data);

            let describe = |entry: Option<&PricedSuburb>| match entry {
                Some(p) => format!("{} (#{}) {}", p.suburb, p.rank, utils::fmt_aud(p.value)),
                None => "—".into(),
            };

            println!("─────────────────────────────────");
            println!("  {}", path.display());
            println!("─────────────────────────────────");
            println!("  Suburbs  : {}", summary.suburbs);
            println!("  Priced   : {}", summary.priced);
            println!("  Highest  : {}", describe(summary.highest.as_ref()));
            println!("  Lowest   : {}", describe(summary.lowest.as_ref()));
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}
