//! Workday job scraper
//!
//! Applies the region filter on a Workday career site, walks every listing page
//! and writes the deduplicated jobs to a CSV file.

use anyhow::{Context, bail};
use clap::Parser;
use std::path::PathBuf;
use workday_jobs::{JobScraper, LaunchOptions, ScrapeConfig, export};

#[derive(Parser)]
#[command(name = "workday-scrape")]
#[command(version)]
#[command(about = "Scrape job listings from a Workday career site", long_about = None)]
struct Cli {
    /// Maximum number of pages to scrape
    #[arg(long, short = 'p', value_parser = clap::value_parser!(u32).range(1..))]
    pages: Option<u32>,

    /// Career site listing URL (default: NVIDIA external career site)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// CSV file to write
    #[arg(long, short = 'o', value_name = "FILE", default_value = "nvidia_us_jobs.csv")]
    output: PathBuf,

    /// JSON file overriding selectors, timing and retry budgets
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ScrapeConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScrapeConfig::default(),
    };
    if let Some(url) = cli.url {
        config.url = url;
    }
    if let Some(pages) = cli.pages {
        config.max_pages = Some(pages);
    }

    let mut launch = LaunchOptions::new().headless(!cli.headed);
    if let Some(path) = cli.executable_path {
        launch = launch.chrome_path(path);
    }
    if let Some(dir) = cli.user_data_dir {
        launch = launch.user_data_dir(dir);
    }

    log::info!("Starting the job scraping process...");
    let scraper = JobScraper::new(launch, config).context("Invalid scrape configuration")?;
    let outcome = scraper.scrape();

    if outcome.records.is_empty() {
        bail!("No job listings found after {} attempt(s)", outcome.attempts);
    }

    log::info!("Found {} job listings.", outcome.records.len());
    export::save_csv(&outcome.records, &cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    log::info!("Script execution completed.");
    Ok(())
}
