//! Scripted stand-in for a browser session
//!
//! A `FakeBoard` models one Workday listing: the filter panel, the job-count
//! indicator and a fixed list of pages. Clicking "next" moves to the following
//! page; past the last page the board keeps showing the last one, like the real
//! site. `pause` is free, so waits only cost polls.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::{cell::RefCell, collections::VecDeque, ops::RangeInclusive, rc::Rc, time::Duration};
use workday_jobs::{ElementRef, RenderClient, Result, ScrapeError, Scope, Selector, SessionFactory, SiteSelectors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    FilterButton = 1,
    FilterMenu,
    LocationsGroup,
    RegionCheckbox,
    ViewResults,
    JobCount,
    ListingItem,
    NextButton,
}

impl Target {
    const ALL: [Target; 8] = [
        Target::FilterButton,
        Target::FilterMenu,
        Target::LocationsGroup,
        Target::RegionCheckbox,
        Target::ViewResults,
        Target::JobCount,
        Target::ListingItem,
        Target::NextButton,
    ];

    fn element(self) -> ElementRef {
        ElementRef::new(self as u64)
    }

    fn of(element: &ElementRef) -> Target {
        Target::ALL[(element.id() - 1) as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Navigate(String),
    Click(Target),
    ScrollIntoView(Target),
    ScrollToBottom,
    Execute,
    Close,
}

#[derive(Debug, Default)]
pub struct FakeBoard {
    pub pages: Vec<Vec<Value>>,
    pub job_count_text: Option<String>,

    /// Selectors that never resolve
    pub missing: Vec<Selector>,
    pub checkbox_selected: bool,
    pub fail_navigation: bool,

    /// From this (1-based) page on, the "next" button is gone
    pub next_missing_from_page: Option<usize>,
    /// Number of "next" clicks that raise before clicks start working
    pub next_click_errors: u32,
    /// The session dies when the listing of this (1-based) page is looked up
    pub crash_on_listing_page: Option<usize>,
    /// Listing lookups that come back empty before the listing shows up
    pub listing_hidden_for: u32,
    /// Listing lookups that report a stale element first
    pub listing_stale_for: u32,
    /// Clickability checks on "next" that fail while the button is present
    pub next_unclickable_for: u32,
    /// Clicks on this element raise a stale-element error
    pub stale_on_click: Option<Target>,
    /// Snapshots after a page change that show only half the new page
    pub render_lag: u32,

    pub current: usize,
    pub menu_open: bool,
    pub pending_render: u32,
    pub filter_applied: bool,
    pub crashed: bool,
    pub closed: bool,
    pub events: Vec<Event>,
    pub paused: Duration,
}

impl FakeBoard {
    pub fn new(job_count: u32, pages: Vec<Vec<Value>>) -> Self {
        Self { pages, job_count_text: Some(format!("{} jobs found", job_count)), ..Default::default() }
    }

    /// Board whose filter is already applied, for exercising stages in isolation
    pub fn filtered(job_count: u32, pages: Vec<Vec<Value>>) -> Self {
        Self { filter_applied: true, ..Self::new(job_count, pages) }
    }

    pub fn clicks(&self, target: Target) -> usize {
        self.events.iter().filter(|e| **e == Event::Click(target)).count()
    }

    pub fn page_number(&self) -> usize {
        self.current + 1
    }

    fn current_page(&self) -> &[Value] {
        self.pages.get(self.current).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One listing item as the extraction script would report it
pub fn listing(id: u32) -> Value {
    json!({
        "title": format!("Engineer {}", id),
        "url": format!("https://example.com/job/JR{}", id),
        "location": "US, CA, Santa Clara",
        "job_id": format!("JR{}", id),
    })
}

pub fn page(ids: RangeInclusive<u32>) -> Vec<Value> {
    ids.map(listing).collect()
}

/// Consecutive pages of 20 listings starting at `first_id`
pub fn pages(count: u32, first_id: u32) -> Vec<Vec<Value>> {
    (0..count).map(|p| page(first_id + p * 20..=first_id + p * 20 + 19)).collect()
}

pub struct FakeClient {
    pub board: Rc<RefCell<FakeBoard>>,
    selectors: SiteSelectors,
}

impl FakeClient {
    pub fn new(board: FakeBoard) -> Self {
        Self { board: Rc::new(RefCell::new(board)), selectors: SiteSelectors::default() }
    }

    fn target_of(&self, selector: &Selector) -> Option<Target> {
        let s = &self.selectors;
        let targets = [
            (&s.filter_button, Target::FilterButton),
            (&s.filter_menu, Target::FilterMenu),
            (&s.locations_group, Target::LocationsGroup),
            (&s.region_checkbox, Target::RegionCheckbox),
            (&s.view_results, Target::ViewResults),
            (&s.job_count, Target::JobCount),
            (&s.next_button, Target::NextButton),
        ];
        if let Some((_, target)) = targets.iter().find(|(sel, _)| *sel == selector) {
            return Some(*target);
        }
        (selector == &Selector::css(s.listing_item.clone())).then_some(Target::ListingItem)
    }

    fn check_alive(&self) -> Result<()> {
        let board = self.board.borrow();
        if board.closed {
            return Err(ScrapeError::TabOperationFailed("session already closed".to_string()));
        }
        if board.crashed {
            return Err(ScrapeError::EvaluationFailed("target crashed".to_string()));
        }
        Ok(())
    }
}

impl RenderClient for FakeClient {
    fn navigate(&self, url: &str) -> Result<()> {
        self.check_alive()?;
        let mut board = self.board.borrow_mut();
        board.events.push(Event::Navigate(url.to_string()));
        if board.fail_navigation {
            return Err(ScrapeError::NavigationFailed(format!("Failed to navigate to {}: net::ERR_TIMED_OUT", url)));
        }
        Ok(())
    }

    fn find(&self, scope: Scope<'_>, selector: &Selector) -> Result<Option<ElementRef>> {
        self.check_alive()?;
        let mut board = self.board.borrow_mut();
        if board.missing.contains(selector) {
            return Ok(None);
        }
        let Some(target) = self.target_of(selector) else {
            return Ok(None);
        };

        let present = match target {
            Target::FilterButton | Target::ViewResults => true,
            Target::FilterMenu => board.menu_open,
            Target::LocationsGroup => board.menu_open && scope == Scope::Within(&Target::FilterMenu.element()),
            Target::RegionCheckbox => scope == Scope::Within(&Target::LocationsGroup.element()),
            Target::JobCount => board.filter_applied && board.job_count_text.is_some(),
            Target::ListingItem => {
                if board.crash_on_listing_page == Some(board.page_number()) {
                    board.crashed = true;
                    return Err(ScrapeError::EvaluationFailed("target crashed".to_string()));
                }
                if board.listing_stale_for > 0 {
                    board.listing_stale_for -= 1;
                    return Err(ScrapeError::StaleElement("listing".to_string()));
                }
                if board.listing_hidden_for > 0 {
                    board.listing_hidden_for -= 1;
                    return Ok(None);
                }
                board.filter_applied && !board.current_page().is_empty()
            }
            Target::NextButton => {
                board.filter_applied
                    && board.next_missing_from_page.is_none_or(|from| board.page_number() < from)
            }
        };

        Ok(present.then(|| target.element()))
    }

    fn is_clickable(&self, element: &ElementRef) -> Result<bool> {
        self.check_alive()?;
        let mut board = self.board.borrow_mut();
        if Target::of(element) == Target::NextButton && board.next_unclickable_for > 0 {
            board.next_unclickable_for -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    fn is_selected(&self, element: &ElementRef) -> Result<bool> {
        self.check_alive()?;
        Ok(Target::of(element) == Target::RegionCheckbox && self.board.borrow().checkbox_selected)
    }

    fn text(&self, element: &ElementRef) -> Result<String> {
        self.check_alive()?;
        let board = self.board.borrow();
        match Target::of(element) {
            Target::JobCount => Ok(board.job_count_text.clone().unwrap_or_default()),
            _ => Ok(String::new()),
        }
    }

    fn execute(&self, _script: &str) -> Result<Value> {
        self.check_alive()?;
        let mut board = self.board.borrow_mut();
        board.events.push(Event::Execute);
        if !board.filter_applied {
            return Ok(Value::Array(Vec::new()));
        }
        let mut listings = board.current_page().to_vec();
        if board.pending_render > 0 {
            board.pending_render -= 1;
            listings.truncate(listings.len() / 2);
        }
        Ok(Value::Array(listings))
    }

    fn click(&self, element: &ElementRef) -> Result<()> {
        self.check_alive()?;
        let target = Target::of(element);
        let mut board = self.board.borrow_mut();
        board.events.push(Event::Click(target));
        if board.stale_on_click == Some(target) {
            return Err(ScrapeError::StaleElement(element.to_string()));
        }

        match target {
            Target::FilterButton => board.menu_open = true,
            Target::RegionCheckbox => board.checkbox_selected = !board.checkbox_selected,
            Target::ViewResults => {
                board.filter_applied = true;
                board.menu_open = false;
            }
            Target::NextButton => {
                if board.next_click_errors > 0 {
                    board.next_click_errors -= 1;
                    return Err(ScrapeError::StaleElement(element.to_string()));
                }
                if board.current + 1 < board.pages.len() {
                    board.current += 1;
                    board.pending_render = board.render_lag;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn scroll_into_view(&self, element: &ElementRef) -> Result<()> {
        self.check_alive()?;
        self.board.borrow_mut().events.push(Event::ScrollIntoView(Target::of(element)));
        Ok(())
    }

    fn scroll_to_bottom(&self) -> Result<()> {
        self.check_alive()?;
        self.board.borrow_mut().events.push(Event::ScrollToBottom);
        Ok(())
    }

    fn pause(&self, duration: Duration) {
        self.board.borrow_mut().paused += duration;
    }

    fn close(&self) -> Result<()> {
        let mut board = self.board.borrow_mut();
        board.events.push(Event::Close);
        board.closed = true;
        Ok(())
    }
}

/// Hands out one scripted board per session; runs dry with a launch failure
pub struct FakeFactory {
    boards: RefCell<VecDeque<FakeBoard>>,
    opened: RefCell<Vec<Rc<RefCell<FakeBoard>>>>,
}

impl FakeFactory {
    pub fn new(boards: Vec<FakeBoard>) -> Self {
        Self { boards: RefCell::new(boards.into()), opened: RefCell::new(Vec::new()) }
    }

    /// Boards of every session opened so far, in order
    pub fn sessions(&self) -> Vec<Rc<RefCell<FakeBoard>>> {
        self.opened.borrow().clone()
    }
}

impl SessionFactory for &FakeFactory {
    type Client = FakeClient;

    fn open(&self) -> Result<FakeClient> {
        let board = self
            .boards
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ScrapeError::LaunchFailed("no browser available".to_string()))?;
        let client = FakeClient::new(board);
        self.opened.borrow_mut().push(client.board.clone());
        Ok(client)
    }
}
