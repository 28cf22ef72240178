use crate::browser::{RenderClient, Selector};
use crate::config::{RetryPolicy, ScrapeConfig, Timing};
use crate::error::{Result, ScrapeError};
use crate::locator::{self, Wait};
use crate::scrape::extractor::PageExtractor;

/// Position in the paginated listing
///
/// The page count is derived once from the job-count indicator and never
/// recomputed, even if the remote count drifts during the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current_page: u32,
    total_pages: u32,
}

impl PageCursor {
    /// Cursor on page 1 of `ceil(job_count / page_size)` pages (at least one)
    pub fn from_job_count(job_count: u32, page_size: u32) -> Self {
        let total_pages = job_count.div_ceil(page_size.max(1)).max(1);
        Self { current_page: 1, total_pages }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn advance(&mut self) {
        self.current_page += 1;
    }
}

/// Leading integer of a job-count text such as "47 jobs found" or "1,204 JOBS FOUND"
pub fn parse_job_count(text: &str) -> Option<u32> {
    let token = text.split_whitespace().next()?;
    token.replace(',', "").parse().ok()
}

/// Moves the listing to the next page and confirms new content arrived
pub struct Paginator<'a> {
    timing: &'a Timing,
    retry: &'a RetryPolicy,
    next_button: &'a Selector,
    extractor: &'a PageExtractor<'a>,
}

impl<'a> Paginator<'a> {
    pub fn new(config: &'a ScrapeConfig, extractor: &'a PageExtractor<'a>) -> Self {
        Self { timing: &config.timing, retry: &config.retry, next_button: &config.selectors.next_button, extractor }
    }

    /// Advance from the cursor's page to the next one
    ///
    /// `previous_first_id` is the job id of the first listing on the current page;
    /// a different first id is how the new page is recognised early. Every attempt
    /// failure is retried after a backoff; once the budget is spent the failure is
    /// returned to the caller.
    pub fn advance<C: RenderClient + ?Sized>(
        &self,
        client: &C,
        cursor: &PageCursor,
        previous_first_id: Option<&str>,
    ) -> Result<()> {
        let target = cursor.current_page() + 1;
        log::info!("Attempting to navigate to page {}...", target);

        // Workday renders the pager lazily
        client.scroll_to_bottom()?;
        client.pause(self.timing.scroll_settle());
        log::debug!("Scrolled to bottom of page");

        let attempts = self.retry.pagination_attempts;
        let mut last_reason = String::new();
        for attempt in 1..=attempts {
            log::debug!("Attempt {} to find and click 'next' button", attempt);
            match self.try_advance(client, previous_first_id) {
                Ok(true) => {
                    log::info!("Successfully navigated to page {}", target);
                    return Ok(());
                }
                Ok(false) => {
                    log::warn!("No jobs loaded after clicking 'next' (attempt {})", attempt);
                    last_reason = "no listings rendered after clicking next".to_string();
                }
                Err(e) => {
                    log::warn!("Error during pagination attempt {}: {}", attempt, e);
                    last_reason = e.to_string();
                }
            }
            if attempt < attempts {
                client.pause(self.timing.retry_backoff());
            }
        }

        Err(ScrapeError::PaginationExhausted { page: target, attempts, reason: last_reason })
    }

    fn try_advance<C: RenderClient + ?Sized>(&self, client: &C, previous_first_id: Option<&str>) -> Result<bool> {
        let wait = Wait::new(self.timing.next_button_wait(), self.timing.poll_interval());
        let next = locator::locate_clickable(client, self.next_button, wait)?
            .ok_or_else(|| ScrapeError::ElementNotFound(format!("'next' button not clickable: {}", self.next_button)))?;

        client.scroll_into_view(&next)?;
        client.pause(self.timing.next_button_settle());
        client.click(&next)?;
        log::debug!("Clicked 'next' button");

        self.wait_for_new_page(client, previous_first_id)
    }

    /// Poll until the listing shows a different first job and its length holds
    /// across two consecutive polls, accepting any non-empty listing once the
    /// page-load budget is spent
    fn wait_for_new_page<C: RenderClient + ?Sized>(&self, client: &C, previous_first_id: Option<&str>) -> Result<bool> {
        let wait = Wait::new(self.timing.page_load(), self.timing.poll_interval());
        let mut last_len = None;
        let replaced = locator::poll_until(client, wait, || {
            let page = self.extractor.snapshot(client)?;
            let first_id = page.first().and_then(|r| r.job_id.as_deref());
            let moved = !page.is_empty() && (previous_first_id.is_none() || first_id != previous_first_id);
            // A listing still filling in changes length between polls
            let settled = moved && last_len == Some(page.len());
            last_len = Some(page.len());
            Ok(settled.then_some(()))
        })?;

        if replaced.is_some() {
            return Ok(true);
        }
        match last_len {
            Some(len) if len > 0 => {
                log::debug!("Listing not settled after {:?}; accepting {} rendered listings", self.timing.page_load(), len);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
