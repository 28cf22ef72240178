//! Render client boundary
//!
//! The scraper never talks to Chrome directly. Everything it needs from a rendered
//! page goes through the [`RenderClient`] trait:
//! - [`BrowserSession`]: the headless_chrome implementation
//! - [`SessionFactory`]: opens a fresh client for every traversal attempt
//! - [`SessionGuard`]: owns a client for one attempt and closes it on every exit path

pub mod config;
pub mod session;

pub use config::LaunchOptions;
pub use session::BrowserSession;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref, time::Duration};

/// How an element is looked up in the document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    /// CSS selector, e.g. `button[aria-label='next']`
    Css(String),
    /// XPath expression, evaluated relative to the lookup scope
    XPath(String),
}

impl Selector {
    pub fn css(selector: impl Into<String>) -> Self {
        Selector::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Selector::XPath(expression.into())
    }

    /// The raw selector text
    pub fn as_str(&self) -> &str {
        match self {
            Selector::Css(s) | Selector::XPath(s) => s,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(s) => write!(f, "css:{}", s),
            Selector::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// Opaque handle to an element found by a [`RenderClient`]
///
/// Handles stay valid only while the element is attached to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(u64);

impl ElementRef {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Where a lookup starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// The whole document
    Document,
    /// Descendants of a previously located element
    Within(&'a ElementRef),
}

/// Capabilities the scraper needs from a page-rendering engine
///
/// Lookups are single probes: they report what is in the document right now.
/// Bounded waiting is layered on top by [`crate::locator`].
pub trait RenderClient {
    /// Open `url` in the session and wait for the navigation to commit
    fn navigate(&self, url: &str) -> Result<()>;

    /// Look up the first element matching `selector` within `scope`
    fn find(&self, scope: Scope<'_>, selector: &Selector) -> Result<Option<ElementRef>>;

    /// Whether the element is displayed and enabled
    fn is_clickable(&self, element: &ElementRef) -> Result<bool>;

    /// Whether a checkbox/option element is currently selected
    fn is_selected(&self, element: &ElementRef) -> Result<bool>;

    /// Rendered text of the element
    fn text(&self, element: &ElementRef) -> Result<String>;

    /// Run a script body (using `return`) and hand back its JSON-serializable result
    fn execute(&self, script: &str) -> Result<serde_json::Value>;

    /// Programmatic click, dispatched from script so overlays cannot intercept it
    fn click(&self, element: &ElementRef) -> Result<()>;

    fn scroll_into_view(&self, element: &ElementRef) -> Result<()>;

    fn scroll_to_bottom(&self) -> Result<()>;

    /// Let asynchronous rendering settle
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    /// Release the session
    fn close(&self) -> Result<()>;
}

/// Opens a brand-new client for each traversal attempt
pub trait SessionFactory {
    type Client: RenderClient;

    fn open(&self) -> Result<Self::Client>;
}

/// Exclusive owner of a client for the duration of one attempt
///
/// The client is closed when the guard is dropped, whether the attempt
/// succeeded, failed or unwound.
pub struct SessionGuard<C: RenderClient> {
    client: C,
}

impl<C: RenderClient> SessionGuard<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: RenderClient> Deref for SessionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.client
    }
}

impl<C: RenderClient> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        log::info!("Closing the browser session");
        if let Err(e) = self.client.close() {
            log::warn!("Failed to close browser session cleanly: {}", e);
        }
    }
}
