use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One listing item as read from the page, before it is stamped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub job_id: Option<String>,
}

impl RawRecord {
    /// Trim every field, treating blank text as absent
    pub fn normalized(self) -> Self {
        fn clean(field: Option<String>) -> Option<String> {
            field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }

        Self {
            title: clean(self.title),
            url: clean(self.url),
            location: clean(self.location),
            job_id: clean(self.job_id),
        }
    }

    pub fn into_job(self, scrape_timestamp: &str) -> JobRecord {
        JobRecord {
            title: self.title,
            url: self.url,
            location: self.location,
            job_id: self.job_id,
            scrape_timestamp: scrape_timestamp.to_string(),
        }
    }
}

/// A scraped job listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,

    /// De-duplication key
    pub job_id: Option<String>,

    /// ISO-8601 UTC instant shared by every record of one traversal attempt
    pub scrape_timestamp: String,
}

/// Records collected during one traversal attempt, in first-seen order
///
/// The map keys double as the set of processed job ids. A missing job id is a key
/// of its own, so at most one id-less record is kept per attempt.
#[derive(Debug, Clone)]
pub struct JobAccumulator {
    scrape_timestamp: String,
    records: IndexMap<Option<String>, JobRecord>,
}

impl JobAccumulator {
    pub fn new(scrape_timestamp: impl Into<String>) -> Self {
        Self { scrape_timestamp: scrape_timestamp.into(), records: IndexMap::new() }
    }

    pub fn scrape_timestamp(&self) -> &str {
        &self.scrape_timestamp
    }

    /// Append every record whose job id has not been seen yet; returns how many were new
    pub fn absorb(&mut self, page: Vec<RawRecord>) -> usize {
        let mut added = 0;
        for raw in page {
            if self.records.contains_key(&raw.job_id) {
                continue;
            }
            if raw.job_id.is_none() {
                log::warn!("Listing without a job id: {:?}", raw.title);
            }
            let key = raw.job_id.clone();
            self.records.insert(key, raw.into_job(&self.scrape_timestamp));
            added += 1;
        }
        added
    }

    pub fn has_seen(&self, job_id: Option<&str>) -> bool {
        self.records.contains_key(&job_id.map(str::to_string))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &JobRecord> {
        self.records.values()
    }

    pub fn into_records(self) -> Vec<JobRecord> {
        self.records.into_values().collect()
    }
}
