//! Scrape configuration
//!
//! Defaults target the NVIDIA external career site on Workday. Every field can be
//! overridden from a JSON file, so other Workday tenants only need a different
//! URL and, occasionally, a few selectors.

use crate::browser::Selector;
use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

pub const DEFAULT_URL: &str = "https://nvidia.wd5.myworkdayjobs.com/NVIDIAExternalCareerSite";

/// Listings shown per page by Workday
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Top-level scrape configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Listing page to start from
    pub url: String,

    /// Stop after this many pages even if more remain
    pub max_pages: Option<u32>,

    pub page_size: u32,

    pub selectors: SiteSelectors,

    pub timing: Timing,

    pub retry: RetryPolicy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_pages: None,
            page_size: DEFAULT_PAGE_SIZE,
            selectors: SiteSelectors::default(),
            timing: Timing::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ScrapeConfig {
    /// Load a configuration from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ScrapeError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder method: set the target URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder method: cap the number of visited pages
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ScrapeError::InvalidConfig("url must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(ScrapeError::InvalidConfig("page_size must be at least 1".to_string()));
        }
        if self.max_pages == Some(0) {
            return Err(ScrapeError::InvalidConfig("max_pages must be at least 1".to_string()));
        }
        if self.retry.session_attempts == 0 || self.retry.pagination_attempts == 0 {
            return Err(ScrapeError::InvalidConfig("retry budgets must be at least 1".to_string()));
        }
        if self.timing.poll_interval_ms == 0 {
            return Err(ScrapeError::InvalidConfig("poll_interval_ms must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Where things live on the job board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSelectors {
    /// Button that opens the location filter
    pub filter_button: Selector,

    /// The opened filter panel
    pub filter_menu: Selector,

    /// "Locations" grouping, relative to the filter panel
    pub locations_group: Selector,

    /// Target-region checkbox, relative to the locations grouping
    pub region_checkbox: Selector,

    /// "View results" button
    pub view_results: Selector,

    /// Element whose text starts with the total job count
    pub job_count: Selector,

    /// One listing item (CSS, used by the bulk extraction script)
    pub listing_item: String,

    /// Title link inside a listing item; supplies both title and url
    pub title_link: String,

    pub location: String,

    pub job_id: String,

    pub next_button: Selector,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            filter_button: Selector::css("button[data-automation-id='distanceLocation']"),
            filter_menu: Selector::css("div[data-automation-id='filterMenu']"),
            locations_group: Selector::xpath(".//fieldset[.//span[text()='Locations']]"),
            region_checkbox: Selector::xpath(".//input[@id='2fcb99c455831013ea52fb338f2932d8']"),
            view_results: Selector::css("button[data-automation-id='viewAllJobsButton']"),
            job_count: Selector::css("[data-automation-id='jobFoundText']"),
            listing_item: "li.css-1q2dra3".to_string(),
            title_link: r#"a[data-automation-id="jobTitle"]"#.to_string(),
            location: "dd.css-129m7dg".to_string(),
            job_id: "li.css-h2nt8k".to_string(),
            next_button: Selector::css("button[aria-label='next']"),
        }
    }
}

/// Wait budgets, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Ordinary element lookups
    pub element_wait_ms: u64,

    /// Waiting for the first listing item on a page
    pub listing_wait_ms: u64,

    /// Waiting for the "next" control to become clickable
    pub next_button_wait_ms: u64,

    pub poll_interval_ms: u64,

    /// Max wait for the listing to re-render after the filter is applied
    pub filter_settle_ms: u64,

    /// Pause after scrolling to the bottom so lazy controls can load
    pub scroll_settle_ms: u64,

    /// Pause after scrolling the "next" control into view
    pub next_button_settle_ms: u64,

    /// Max wait for the next page to replace the current one
    pub page_load_ms: u64,

    /// Pause between pagination attempts
    pub retry_backoff_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            element_wait_ms: 30_000,
            listing_wait_ms: 3_000,
            next_button_wait_ms: 20_000,
            poll_interval_ms: 250,
            filter_settle_ms: 3_000,
            scroll_settle_ms: 2_000,
            next_button_settle_ms: 1_000,
            page_load_ms: 3_000,
            retry_backoff_ms: 2_000,
        }
    }
}

impl Timing {
    pub fn element_wait(&self) -> Duration {
        Duration::from_millis(self.element_wait_ms)
    }

    pub fn listing_wait(&self) -> Duration {
        Duration::from_millis(self.listing_wait_ms)
    }

    pub fn next_button_wait(&self) -> Duration {
        Duration::from_millis(self.next_button_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn filter_settle(&self) -> Duration {
        Duration::from_millis(self.filter_settle_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn next_button_settle(&self) -> Duration {
        Duration::from_millis(self.next_button_settle_ms)
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Retry budgets; the two are independent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Full traversal attempts, each with a fresh browser session
    pub session_attempts: u32,

    /// Tries per page advance before pagination gives up
    pub pagination_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { session_attempts: 3, pagination_attempts: 3 }
    }
}
