//! CSV export of the outlier listing
//!
//! One row per flagged reply across all analyzed files. Missing timestamps
//! are left as empty fields.

use serde::Serialize;
use std::io;

use crate::analyzer::FileOutcome;
use crate::response::OutlierRecord;

#[derive(Debug, Serialize)]
struct CsvOutlierRow<'a> {
    source: &'a str,
    contact: &'a str,
    received_ts: Option<&'a str>,
    sent_ts: Option<&'a str>,
    response_time_seconds: f64,
    is_outlier: bool,
}

impl<'a> CsvOutlierRow<'a> {
    fn new(source: &'a str, record: &'a OutlierRecord) -> Self {
        Self {
            source,
            contact: &record.contact,
            received_ts: record.received_ts.as_deref(),
            sent_ts: record.sent_ts.as_deref(),
            response_time_seconds: record.response_time_seconds,
            is_outlier: record.is_outlier,
        }
    }
}

/// Write the outliers of every analyzed outcome as CSV (header always present)
pub fn write_outliers_csv<W: io::Write>(writer: W, outcomes: &[FileOutcome]) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record([
        "source",
        "contact",
        "received_ts",
        "sent_ts",
        "response_time_seconds",
        "is_outlier",
    ])?;

    for report in outcomes.iter().filter_map(FileOutcome::report) {
        for record in &report.outliers {
            wtr.serialize(CsvOutlierRow::new(&report.source, record))?;
        }
    }
    wtr.flush()?;
    Ok(())
}
