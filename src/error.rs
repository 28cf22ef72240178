use thiserror::Error;

/// Errors produced while driving the browser or traversing a job board
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The browser process could not be started
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Navigation to the target address failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// A tab could not be created, found or closed
    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// A required element did not show up in time
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The element was detached from the document between lookup and use
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// JavaScript evaluation in the page failed
    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    /// A page script returned something we could not interpret
    #[error("Unexpected script result: {0}")]
    ScriptResultInvalid(String),

    /// The job-count indicator was missing or did not start with an integer
    #[error("Job count unavailable: {0}")]
    JobCountUnavailable(String),

    /// The "next" control could not be driven within the retry budget
    #[error("Pagination to page {page} failed after {attempts} attempts: {reason}")]
    PaginationExhausted { page: u32, attempts: u32, reason: String },

    /// Invalid scrape configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Whether this error only means the element went away under us
    pub fn is_stale(&self) -> bool {
        matches!(self, ScrapeError::StaleElement(_))
    }
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;
