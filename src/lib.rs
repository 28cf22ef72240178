//! # workday-jobs
//!
//! Scrapes job listings from a Workday career site by driving Chrome through the
//! DevTools Protocol (CDP), producing a deduplicated, timestamped dataset.
//!
//! ## Features
//!
//! - **Region filter**: opens the location filter panel and narrows the listing to one region
//! - **Atomic page reads**: every page is read in one script call, so fields never mix across re-renders
//! - **Resilient pagination**: bounded retries on the "next" control, with early detection of the new page
//! - **Session retries**: a failed traversal is restarted from scratch on a fresh browser
//! - **CSV export**: fixed-column output, one row per job
//!
//! ## Command line
//!
//! ```bash
//! # Scrape every page
//! cargo run --bin workday-scrape
//!
//! # Stop after 3 pages, watch the browser
//! cargo run --bin workday-scrape -- --pages 3 --headed
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use workday_jobs::{JobScraper, LaunchOptions, ScrapeConfig};
//!
//! # fn main() -> workday_jobs::Result<()> {
//! let config = ScrapeConfig::default().with_max_pages(2);
//! let scraper = JobScraper::new(LaunchOptions::default(), config)?;
//!
//! let outcome = scraper.scrape();
//! println!("Collected {} jobs in {} attempt(s)", outcome.records.len(), outcome.attempts);
//!
//! workday_jobs::export::save_csv(&outcome.records, "jobs.csv")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: the render client boundary and its headless_chrome implementation
//! - [`locator`]: bounded-wait element lookups
//! - [`scrape`]: filter, extraction, pagination and the traversal state machine
//! - [`config`]: selectors, timing and retry budgets
//! - [`export`]: CSV output
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod locator;
pub mod scrape;

pub use browser::{BrowserSession, ElementRef, LaunchOptions, RenderClient, Scope, Selector, SessionFactory};
pub use config::{RetryPolicy, ScrapeConfig, SiteSelectors, Timing};
pub use error::{Result, ScrapeError};
pub use scrape::{JobRecord, JobScraper, RawRecord, ScrapeOutcome, StopReason};
