use crate::browser::{ElementRef, RenderClient, Scope, Selector};
use crate::config::{ScrapeConfig, SiteSelectors, Timing};
use crate::error::Result;
use crate::locator::{self, Wait};
use std::fmt;

/// One locate step of the region filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStep {
    FilterButton,
    FilterMenu,
    LocationsGroup,
    RegionCheckbox,
    ViewResults,
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterStep::FilterButton => "location filter button",
            FilterStep::FilterMenu => "filter menu",
            FilterStep::LocationsGroup => "locations section",
            FilterStep::RegionCheckbox => "region checkbox",
            FilterStep::ViewResults => "view results button",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Applied,
    /// The step whose element never showed up
    Missing(FilterStep),
}

impl FilterOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FilterOutcome::Applied)
    }
}

/// Narrows the listing to the configured region through the filter panel
pub struct FilterStage<'a> {
    selectors: &'a SiteSelectors,
    timing: &'a Timing,
}

impl<'a> FilterStage<'a> {
    pub fn new(config: &'a ScrapeConfig) -> Self {
        Self { selectors: &config.selectors, timing: &config.timing }
    }

    /// Run the filter workflow; a missing element is reported, never raised
    pub fn apply<C: RenderClient + ?Sized>(&self, client: &C) -> Result<FilterOutcome> {
        log::info!("Applying region filter...");
        let s = self.selectors;

        let Some(button) = self.require(client, Scope::Document, &s.filter_button, FilterStep::FilterButton)? else {
            return Ok(FilterOutcome::Missing(FilterStep::FilterButton));
        };
        if !self.press(client, &button, FilterStep::FilterButton)? {
            return Ok(FilterOutcome::Missing(FilterStep::FilterButton));
        }

        let Some(menu) = self.require(client, Scope::Document, &s.filter_menu, FilterStep::FilterMenu)? else {
            return Ok(FilterOutcome::Missing(FilterStep::FilterMenu));
        };

        let Some(group) = self.require(client, Scope::Within(&menu), &s.locations_group, FilterStep::LocationsGroup)?
        else {
            return Ok(FilterOutcome::Missing(FilterStep::LocationsGroup));
        };

        let Some(checkbox) =
            self.require(client, Scope::Within(&group), &s.region_checkbox, FilterStep::RegionCheckbox)?
        else {
            return Ok(FilterOutcome::Missing(FilterStep::RegionCheckbox));
        };

        // Clicking a selected checkbox would clear it
        if client.is_selected(&checkbox)? {
            log::debug!("Region checkbox already selected");
        } else if !self.press(client, &checkbox, FilterStep::RegionCheckbox)? {
            return Ok(FilterOutcome::Missing(FilterStep::RegionCheckbox));
        }

        let Some(view_results) = self.require(client, Scope::Document, &s.view_results, FilterStep::ViewResults)? else {
            return Ok(FilterOutcome::Missing(FilterStep::ViewResults));
        };

        let count_before = self.count_text(client)?;
        if !self.press(client, &view_results, FilterStep::ViewResults)? {
            return Ok(FilterOutcome::Missing(FilterStep::ViewResults));
        }
        self.wait_for_refresh(client, count_before.as_deref())?;

        log::info!("Region filter applied successfully.");
        Ok(FilterOutcome::Applied)
    }

    fn require<C: RenderClient + ?Sized>(
        &self,
        client: &C,
        scope: Scope<'_>,
        selector: &Selector,
        step: FilterStep,
    ) -> Result<Option<ElementRef>> {
        let wait = Wait::new(self.timing.element_wait(), self.timing.poll_interval());
        let found = locator::locate(client, scope, selector, wait)?;
        if found.is_none() {
            log::error!("{} not found ({}). Page might not have loaded correctly.", step, selector);
        }
        Ok(found)
    }

    /// Click a located element; one that went stale in between counts as missing
    fn press<C: RenderClient + ?Sized>(&self, client: &C, element: &ElementRef, step: FilterStep) -> Result<bool> {
        match client.click(element) {
            Ok(()) => Ok(true),
            Err(e) if e.is_stale() => {
                log::error!("{} went stale before it could be clicked: {}", step, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Current job-count text, if the indicator is on the page right now
    fn count_text<C: RenderClient + ?Sized>(&self, client: &C) -> Result<Option<String>> {
        let Some(indicator) = client.find(Scope::Document, &self.selectors.job_count)? else {
            return Ok(None);
        };
        match client.text(&indicator) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_stale() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Wait until the job count reflects the filtered listing, or the settle budget runs out
    fn wait_for_refresh<C: RenderClient + ?Sized>(&self, client: &C, count_before: Option<&str>) -> Result<()> {
        let wait = Wait::new(self.timing.filter_settle(), self.timing.poll_interval());
        let refreshed = locator::poll_until(client, wait, || {
            Ok(self.count_text(client)?.filter(|text| Some(text.as_str()) != count_before))
        })?;

        match refreshed {
            Some(text) => log::debug!("Listing refreshed: {}", text.trim()),
            None => log::debug!("Job count unchanged after {:?}; continuing", self.timing.filter_settle()),
        }
        Ok(())
    }
}
