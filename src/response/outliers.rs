// Outlier screening of response latencies

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::response::pairing::ResponsePair;
use crate::stats::iqr_outliers;

/// Layout used for timestamps in the outlier listing
///
/// The fraction is printed only when non-zero, in 3, 6 or 9 digits.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One row of the outlier listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierRecord {
    pub contact: String,
    /// `None` serializes as `null`
    pub received_ts: Option<String>,
    pub sent_ts: Option<String>,
    pub response_time_seconds: f64,
    pub is_outlier: bool,
}

impl OutlierRecord {
    pub fn new(
        contact: impl Into<String>,
        received_at: Option<NaiveDateTime>,
        sent_at: Option<NaiveDateTime>,
        response_time_seconds: f64,
    ) -> Self {
        Self {
            contact: contact.into(),
            received_ts: received_at.map(format_timestamp),
            sent_ts: sent_at.map(format_timestamp),
            response_time_seconds,
            is_outlier: true,
        }
    }
}

pub(crate) fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// One flag per pair: latency strictly outside the IQR fence
pub fn flag_outliers(pairs: &[ResponsePair], multiplier: f64) -> Vec<bool> {
    let latencies: Vec<f64> = pairs.iter().map(|p| p.response_time_seconds).collect();
    let mut flags = vec![false; pairs.len()];
    for index in iqr_outliers(&latencies, multiplier) {
        flags[index] = true;
    }
    flags
}

/// Listing of the flagged pairs, in pair order
pub fn outlier_listing(pairs: &[ResponsePair], flags: &[bool]) -> Vec<OutlierRecord> {
    pairs
        .iter()
        .zip(flags)
        .filter(|(_, &flagged)| flagged)
        .map(|(pair, _)| {
            OutlierRecord::new(
                pair.contact.clone(),
                Some(pair.received_at),
                Some(pair.sent_at),
                pair.response_time_seconds,
            )
        })
        .collect()
}
