// Response pairing
//
// A pair is a received record immediately followed, within the same contact,
// by a sent record. Records are grouped with a stable sort on
// (contact, timestamp) so equal timestamps keep their input order.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::record::{elapsed_seconds, Direction, Record};

/// A received message and the reply that followed it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsePair {
    pub contact: String,
    pub received_at: NaiveDateTime,
    pub sent_at: NaiveDateTime,
    /// Seconds between receipt and reply (microsecond precision, always > 0)
    pub response_time_seconds: f64,
}

/// Derive response pairs from a record log
///
/// Pairs come out grouped by contact, in timestamp order within a contact.
/// Replies whose timestamp is not strictly after the received message are
/// dropped. An empty result is not an error; callers decide how to report it.
pub fn pair_responses(records: &[Record]) -> Vec<ResponsePair> {
    let mut ordered: Vec<&Record> = records.iter().collect();
    ordered.sort_by(|a, b| {
        a.contact
            .cmp(&b.contact)
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });

    let mut pairs = Vec::new();
    let mut dropped = 0usize;

    for window in ordered.windows(2) {
        let (prev, curr) = (window[0], window[1]);
        if prev.contact != curr.contact
            || prev.direction != Direction::Received
            || curr.direction != Direction::Sent
        {
            continue;
        }

        let seconds = elapsed_seconds(prev.timestamp, curr.timestamp);
        if seconds <= 0.0 {
            dropped += 1;
            continue;
        }

        pairs.push(ResponsePair {
            contact: curr.contact.clone(),
            received_at: prev.timestamp,
            sent_at: curr.timestamp,
            response_time_seconds: seconds,
        });
    }

    tracing::debug!(
        records = records.len(),
        pairs = pairs.len(),
        dropped_non_positive = dropped,
        "paired responses"
    );
    pairs
}
