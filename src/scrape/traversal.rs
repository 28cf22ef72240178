use crate::browser::{RenderClient, Scope, SessionFactory, SessionGuard};
use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::locator::{self, Wait};
use crate::scrape::extractor::PageExtractor;
use crate::scrape::filter::{FilterOutcome, FilterStage};
use crate::scrape::pagination::{PageCursor, Paginator, parse_job_count};
use crate::scrape::record::{JobAccumulator, JobRecord};
use chrono::Utc;
use std::fmt;

/// Phase of a traversal attempt, used to report where an attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Launch,
    Navigate,
    Filter,
    CountRead,
    PageLoop,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Launch => "browser launch",
            Stage::Navigate => "navigation",
            Stage::Filter => "region filter",
            Stage::CountRead => "job count",
            Stage::PageLoop => "page loop",
        };
        f.write_str(name)
    }
}

/// Why the page loop of a successful attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every page up to the initial page count was read
    Exhausted,
    /// The page brought no unseen job ids; the board repeats its last page
    NoNewRecords { page: u32 },
    /// The configured page cap was reached
    PageCap { cap: u32 },
    /// The next page could not be reached; records up to `page` are kept
    PaginationFailed { page: u32 },
}

/// A traversal attempt that ended before its page loop finished
#[derive(Debug)]
pub struct AttemptFailure {
    pub stage: Stage,
    pub error: ScrapeError,

    /// Records the attempt had collected when it failed
    pub partial: Vec<JobRecord>,
}

impl AttemptFailure {
    fn at(stage: Stage) -> impl FnOnce(ScrapeError) -> AttemptFailure {
        move |error| AttemptFailure { stage, error, partial: Vec::new() }
    }
}

/// Result of a full scrape run
#[derive(Debug)]
pub struct ScrapeOutcome {
    /// Deduplicated records in first-seen order
    pub records: Vec<JobRecord>,

    /// Attempts made, including the successful one
    pub attempts: u32,

    /// How the successful attempt ended; `None` when every attempt failed
    pub stop: Option<StopReason>,
}

impl ScrapeOutcome {
    pub fn is_success(&self) -> bool {
        self.stop.is_some()
    }

    pub fn into_records(self) -> Vec<JobRecord> {
        self.records
    }
}

/// Drives the filter → count → paginate traversal with session-level retries
pub struct JobScraper<F: SessionFactory> {
    factory: F,
    config: ScrapeConfig,
}

impl<F: SessionFactory> JobScraper<F> {
    pub fn new(factory: F, config: ScrapeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { factory, config })
    }

    /// Scrape the board, retrying the whole traversal with a fresh session on failure
    ///
    /// Never fails outright: when every attempt fails the last attempt's partial
    /// (usually empty) records are returned with `stop == None`.
    pub fn scrape(&self) -> ScrapeOutcome {
        let attempts = self.config.retry.session_attempts;
        let mut last_partial = Vec::new();

        for attempt in 1..=attempts {
            log::info!("Starting attempt {} of {}", attempt, attempts);
            match self.run_attempt() {
                Ok((records, stop)) => {
                    log::info!("Attempt {} collected {} jobs ({:?})", attempt, records.len(), stop);
                    return ScrapeOutcome { records, attempts: attempt, stop: Some(stop) };
                }
                Err(failure) => {
                    log::warn!("Attempt {} failed during {}: {}", attempt, failure.stage, failure.error);
                    last_partial = failure.partial;
                }
            }

            if attempt < attempts {
                log::info!("Retrying... Attempt {} of {}", attempt + 1, attempts);
            } else {
                log::error!("Max retries reached. Scraping failed.");
            }
        }

        ScrapeOutcome { records: last_partial, attempts, stop: None }
    }

    /// One attempt on its own session; the session is closed on every exit path
    fn run_attempt(&self) -> std::result::Result<(Vec<JobRecord>, StopReason), AttemptFailure> {
        let client = self.factory.open().map_err(AttemptFailure::at(Stage::Launch))?;
        let session = SessionGuard::new(client);
        self.traverse(&*session)
    }

    fn traverse<C: RenderClient + ?Sized>(
        &self,
        client: &C,
    ) -> std::result::Result<(Vec<JobRecord>, StopReason), AttemptFailure> {
        log::info!("Navigating to URL: {}", self.config.url);
        client.navigate(&self.config.url).map_err(AttemptFailure::at(Stage::Navigate))?;

        let filter = FilterStage::new(&self.config);
        if let FilterOutcome::Missing(step) = filter.apply(client).map_err(AttemptFailure::at(Stage::Filter))? {
            return Err(AttemptFailure::at(Stage::Filter)(ScrapeError::ElementNotFound(step.to_string())));
        }

        let mut cursor = self.read_page_count(client).map_err(AttemptFailure::at(Stage::CountRead))?;

        let extractor = PageExtractor::new(&self.config);
        let paginator = Paginator::new(&self.config, &extractor);
        let mut jobs = JobAccumulator::new(Utc::now().to_rfc3339());

        let stop = loop {
            let page = cursor.current_page();
            log::info!("Scraping page {} of {}...", page, cursor.total_pages());

            let listings = match extractor.extract_current_page(client) {
                Ok(listings) => listings,
                Err(error) => {
                    return Err(AttemptFailure { stage: Stage::PageLoop, error, partial: jobs.into_records() });
                }
            };
            log::info!("Found {} job listings on page {}.", listings.len(), page);

            let first_id = listings.first().and_then(|r| r.job_id.clone());
            let added = jobs.absorb(listings);
            log::info!("Added {} new jobs from page {}", added, page);

            if added == 0 && page > 1 {
                log::info!("No new jobs on this page. Ending scrape.");
                break StopReason::NoNewRecords { page };
            }

            if let Some(cap) = self.config.max_pages {
                if page >= cap {
                    log::info!("Reached specified maximum of {} pages. Ending scrape.", cap);
                    break StopReason::PageCap { cap };
                }
            }

            if !cursor.has_next() {
                break StopReason::Exhausted;
            }

            if let Err(e) = paginator.advance(client, &cursor, first_id.as_deref()) {
                log::warn!("{}. Ending scrape with {} jobs.", e, jobs.len());
                break StopReason::PaginationFailed { page };
            }
            cursor.advance();
        };

        Ok((jobs.into_records(), stop))
    }

    /// Read the job-count indicator and derive the page count from it
    fn read_page_count<C: RenderClient + ?Sized>(&self, client: &C) -> Result<PageCursor> {
        let timing = &self.config.timing;
        let wait = Wait::new(timing.element_wait(), timing.poll_interval());
        let indicator = locator::locate(client, Scope::Document, &self.config.selectors.job_count, wait)?
            .ok_or_else(|| ScrapeError::JobCountUnavailable("job count not found".to_string()))?;

        let text = client.text(&indicator)?;
        let job_count = parse_job_count(&text)
            .ok_or_else(|| ScrapeError::JobCountUnavailable(format!("cannot parse job count from {:?}", text.trim())))?;

        let cursor = PageCursor::from_job_count(job_count, self.config.page_size);
        log::info!("Total jobs: {}, Total pages to scrape: {}", job_count, cursor.total_pages());
        Ok(cursor)
    }
}
