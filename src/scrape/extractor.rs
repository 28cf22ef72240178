use crate::browser::{RenderClient, Scope, Selector};
use crate::config::{ScrapeConfig, SiteSelectors, Timing};
use crate::error::{Result, ScrapeError};
use crate::locator::{self, Wait};
use crate::scrape::record::RawRecord;
use serde_json::Value;

/// Reads the listing items rendered on the current page
pub struct PageExtractor<'a> {
    timing: &'a Timing,
    listing_item: Selector,
    script: String,
}

impl<'a> PageExtractor<'a> {
    pub fn new(config: &'a ScrapeConfig) -> Self {
        Self {
            timing: &config.timing,
            listing_item: Selector::css(config.selectors.listing_item.clone()),
            script: snapshot_script(&config.selectors),
        }
    }

    /// Wait briefly for the listing, then read it
    ///
    /// An empty page after the short wait is an ordinary result, not an error.
    pub fn extract_current_page<C: RenderClient + ?Sized>(&self, client: &C) -> Result<Vec<RawRecord>> {
        let wait = Wait::new(self.timing.listing_wait(), self.timing.poll_interval());
        if locator::locate(client, Scope::Document, &self.listing_item, wait)?.is_none() {
            log::warn!("No job listings rendered within {:?}", self.timing.listing_wait());
            return Ok(Vec::new());
        }
        self.snapshot(client)
    }

    /// Read every rendered listing item in a single script call
    ///
    /// One call keeps all fields of all items from the same render; per-field
    /// lookups could interleave with client-side re-rendering.
    pub fn snapshot<C: RenderClient + ?Sized>(&self, client: &C) -> Result<Vec<RawRecord>> {
        let value = client.execute(&self.script)?;
        parse_snapshot(value)
    }
}

fn parse_snapshot(value: Value) -> Result<Vec<RawRecord>> {
    let records: Vec<RawRecord> = match value {
        Value::Null => Vec::new(),
        other => serde_json::from_value(other)
            .map_err(|e| ScrapeError::ScriptResultInvalid(format!("Failed to parse listing snapshot: {}", e)))?,
    };
    Ok(records.into_iter().map(RawRecord::normalized).collect())
}

fn snapshot_script(selectors: &SiteSelectors) -> String {
    let quote = |s: &str| Value::String(s.to_string()).to_string();
    format!(
        r#"return Array.from(document.querySelectorAll({item})).map(el => {{
    const link = el.querySelector({title});
    const location = el.querySelector({location});
    const jobId = el.querySelector({job_id});
    return {{
        title: link ? link.textContent : null,
        url: link ? link.href : null,
        location: location ? location.textContent : null,
        job_id: jobId ? jobId.textContent : null
    }};
}});"#,
        item = quote(&selectors.listing_item),
        title = quote(&selectors.title_link),
        location = quote(&selectors.location),
        job_id = quote(&selectors.job_id),
    )
}
