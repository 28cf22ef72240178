//! CSV export of scraped jobs

use crate::error::Result;
use crate::scrape::JobRecord;
use std::{io::Write, path::Path};

/// Column order of the exported table
pub const CSV_COLUMNS: [&str; 5] = ["title", "location", "job_id", "url", "scrape_timestamp"];

/// Write a header row and one row per record; absent fields become empty cells
pub fn write_csv<W: Write>(records: &[JobRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_COLUMNS)?;

    for job in records {
        csv_writer.write_record([
            job.title.as_deref().unwrap_or_default(),
            job.location.as_deref().unwrap_or_default(),
            job.job_id.as_deref().unwrap_or_default(),
            job.url.as_deref().unwrap_or_default(),
            job.scrape_timestamp.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Save records to `path`, replacing any existing file
pub fn save_csv(records: &[JobRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    log::info!("Saving {} jobs to {}...", records.len(), path.display());
    let file = std::fs::File::create(path)?;
    write_csv(records, std::io::BufWriter::new(file))?;
    log::info!("Jobs saved successfully to {}", path.display());
    Ok(())
}
