//! Job board traversal
//!
//! This module holds the scraping workflow proper:
//! - record: JobRecord and the deduplicating JobAccumulator
//! - filter: narrowing the listing to one region
//! - extractor: atomic snapshot reads of the current page
//! - pagination: PageCursor and the retrying "next" click
//! - traversal: JobScraper, the attempt loop tying it all together

pub mod extractor;
pub mod filter;
pub mod pagination;
pub mod record;
pub mod traversal;

pub use extractor::PageExtractor;
pub use filter::{FilterOutcome, FilterStage, FilterStep};
pub use pagination::{PageCursor, Paginator, parse_job_count};
pub use record::{JobAccumulator, JobRecord, RawRecord};
pub use traversal::{AttemptFailure, JobScraper, ScrapeOutcome, Stage, StopReason};
