mod archiver;
mod config;
mod fetcher;
mod links;
mod models;
mod parser;
mod pipeline;
mod query;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_OUTPUT, DEFAULT_USER_AGENT, ScraperConfig};
use crate::fetcher::Fetcher;

/// Search Walmart and archive product details as JSON.
#[derive(Parser, Debug)]
#[command(name = "walmart_product_scraper", version, about)]
struct Args {
    /// Product to search for (prompted for when omitted)
    query: Option<String>,

    /// Maximum number of product pages to fetch
    #[arg(short = 'n', long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(1..))]
    max_results: u32,

    /// Maximum number of search result pages to scan
    #[arg(short = 'p', long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: u32,

    /// Output file, overwritten on every run
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    #[arg(long, env = "WALMART_SCRAPER_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    #[arg(long, env = "WALMART_SCRAPER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Minimum pause between requests, in milliseconds
    #[arg(long, default_value_t = 900)]
    delay_ms: u64,

    /// Random extra pause added on top of --delay-ms, in milliseconds
    #[arg(long, default_value_t = 700)]
    jitter_ms: u64,

    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Log extraction details to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> ScraperConfig {
        ScraperConfig {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            delay: Duration::from_millis(self.delay_ms),
            jitter: Duration::from_millis(self.jitter_ms),
            max_pages: self.max_pages,
            output: self.output.clone(),
            ..ScraperConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let query = match &args.query {
        Some(query) => query.clone(),
        None => prompt("Enter the product to search: ")?,
    };
    let query = query::normalize_query(&query).context("no query provided")?;
    let config = args.to_config();
    let max_results = args.max_results as usize;

    println!(
        "Searching Walmart for: '{}' (up to {} products, scanning up to {} pages)",
        query, max_results, config.max_pages
    );

    let records = {
        let mut fetcher = Fetcher::new(&config).context("building HTTP client")?;
        pipeline::run(&mut fetcher, &config, &query, max_results)?
    };

    archiver::print_summary(&records);
    archiver::save_to_file(&records, &config.output)?;
    println!("\nSaved {} results to {}", records.len(), config.output.display());
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "warn,walmart_product_scraper=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("no query provided (stdin closed)");
    }
    Ok(line)
}
