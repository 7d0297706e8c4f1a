//! thinknum: batch runner for the Thinknum connections API
//!
//! This is the main entry point for the application.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thinknum_client::{
    config::{self, Settings},
    search::split::{self, DATE_FORMAT},
    Client, SearchDefinition,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thinknum", version, about = "Run Thinknum searches in batch")]
struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short, long, env = "THINKNUM_CONFIG", default_value = "config.json", global = true)]
    config: PathBuf,

    /// Number of searches run concurrently
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run every enabled search and save the results
    Run,
    /// List datasets
    Datasets {
        /// Only datasets covering this ticker
        #[arg(short, long)]
        ticker: Option<String>,
    },
    /// List the tickers of a dataset
    Tickers {
        #[arg(short, long)]
        dataset: String,
    },
    /// Split a search read from stdin into date-ranged copies
    Split {
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
        #[arg(long, default_value_t = 1)]
        interval_days: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Split {
        from,
        to,
        interval_days,
    }) = cli.command
    {
        init_logging(false);
        return split_search(from, to, interval_days);
    }

    let mut settings = config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(workers) = cli.workers {
        settings.workers = workers;
    }
    init_logging(settings.debug);

    info!("Starting thinknum v{}", thinknum_client::VERSION);

    let client = Client::connect(settings).await?;
    info!("Authenticated against {}", client.settings().auth.base_url());

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&client).await,
        Command::Datasets { ticker } => {
            for dataset in client.datasets(ticker.as_deref()).await? {
                println!("{}  {}", dataset.id, dataset.display_name);
            }
            Ok(())
        }
        Command::Tickers { dataset } => {
            let tickers = client.tickers(&dataset).await?;
            println!("{} tickers", tickers.len());
            for ticker in tickers {
                println!("{}  {}", ticker.id, ticker.display_name);
            }
            Ok(())
        }
        Command::Split { .. } => Ok(()),
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(client: &Client) -> Result<()> {
    let settings: &Settings = client.settings();
    let mut outcomes = client.run_all(settings.workers)?;

    let (mut succeeded, mut failed) = (0usize, 0usize);
    while let Some(outcome) = outcomes.recv().await {
        match outcome.error {
            Some(ref e) => {
                failed += 1;
                error!("Search {} failed: {}", outcome.name(), e);
            }
            None => {
                succeeded += 1;
                for saved in client.save(&outcome) {
                    if let Some(e) = saved.error {
                        warn!("{}: {} not saved: {}", saved.search_name, saved.format, e);
                    }
                }

                let data = &outcome.data;
                println!("Search: {}", outcome.name());
                println!("  Fields: {}", data.fields.len());
                println!("  Rows:   {}/{}", data.rows.len(), data.total);
                println!("  Pages:  {}", data.pages);
            }
        }
    }

    info!("Finished: {} succeeded, {} failed", succeeded, failed);
    Ok(())
}

fn split_search(from: NaiveDate, to: NaiveDate, interval_days: i64) -> Result<()> {
    let search = SearchDefinition::from_reader(std::io::stdin().lock())
        .context("reading search definition from stdin")?;
    let interval = split::interval_days(interval_days)?;
    let searches = search.split(from, to, interval)?;
    println!("{}", serde_json::to_string_pretty(&searches)?);
    Ok(())
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("{}: {}", s, e))
}
