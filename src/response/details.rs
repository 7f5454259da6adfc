// Per-pair detail table

use serde::Serialize;

use crate::config::ResponseConfig;
use crate::response::outliers::format_timestamp;
use crate::response::pairing::ResponsePair;

/// One response pair with its classification flags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDetail {
    pub contact: String,
    pub received_ts: String,
    pub sent_ts: String,
    pub response_time_seconds: f64,
    pub is_outlier: bool,
    pub is_quick: bool,
    pub is_delayed: bool,
}

/// Every pair in pair order, marked with its outlier flag from `flags`
///
/// `flags` must come from [`crate::response::flag_outliers`] over the same
/// pairs; a missing flag reads as not an outlier.
pub fn response_details(
    pairs: &[ResponsePair],
    flags: &[bool],
    config: &ResponseConfig,
) -> Vec<ResponseDetail> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            let latency = pair.response_time_seconds;
            ResponseDetail {
                contact: pair.contact.clone(),
                received_ts: format_timestamp(pair.received_at),
                sent_ts: format_timestamp(pair.sent_at),
                response_time_seconds: latency,
                is_outlier: flags.get(i).copied().unwrap_or(false),
                is_quick: config.is_quick(latency),
                is_delayed: config.is_delayed(latency),
            }
        })
        .collect()
}
