//! Descriptive counts over the record set
//!
//! Volume by hour, weekday and month always lists every bucket (zeros
//! included) so reports over different files line up. Message frequency
//! counts calendar periods inclusively: a log spanning one afternoon covers
//! one day and one month.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::record::{Direction, Record};
use crate::response::WEEKDAYS;
use crate::stats;

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Whole days between first and last record
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactSummary {
    pub contact: String,
    pub count: usize,
    /// Share of all records, in percent
    pub percentage: f64,
    pub first_contact: NaiveDateTime,
    pub last_contact: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectionCounts {
    pub sent: usize,
    pub received: usize,
}

/// Call lengths over the records that carry one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub count: usize,
    pub total_seconds: f64,
    pub average_seconds: f64,
    pub median_seconds: f64,
    pub min_seconds: f64,
    pub max_seconds: f64,
}

impl DurationStats {
    pub fn from_records(records: &[Record]) -> Option<Self> {
        let durations: Vec<f64> = records.iter().filter_map(|r| r.duration_seconds).collect();
        let average = stats::mean(&durations)?;
        let median = stats::median(&durations)?;

        Some(DurationStats {
            count: durations.len(),
            total_seconds: durations.iter().sum(),
            average_seconds: average,
            median_seconds: median,
            min_seconds: durations.iter().copied().fold(f64::INFINITY, f64::min),
            max_seconds: durations.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Average number of records per calendar period over the covered range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageFrequency {
    pub per_day: f64,
    pub per_week: f64,
    pub per_month: f64,
}

impl MessageFrequency {
    pub fn new(total: usize, range: &DateRange) -> Self {
        let days = (range.days + 1) as f64;
        let months = (range.end.year() - range.start.year()) * 12 + range.end.month() as i32
            - range.start.month() as i32
            + 1;
        let total = total as f64;

        MessageFrequency {
            per_day: total / days,
            per_week: total / (days / 7.0),
            per_month: total / f64::from(months),
        }
    }
}

/// A labelled count, kept in calendar order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStatistics {
    pub total_records: usize,
    pub unique_contacts: usize,
    pub date_range: Option<DateRange>,
    /// `None` for an empty record set
    pub message_frequency: Option<MessageFrequency>,
    /// `None` unless some record has a readable duration
    pub duration_stats: Option<DurationStats>,
    pub top_contacts: Vec<ContactSummary>,
    pub direction_counts: DirectionCounts,
    /// Messages per hour of day, all 24 hours
    pub by_hour: BTreeMap<u32, usize>,
    /// Messages per weekday, Monday first
    pub by_weekday: Vec<Bucket>,
    /// Messages per month, January first
    pub by_month: Vec<Bucket>,
}

struct ContactTally {
    count: usize,
    first: NaiveDateTime,
    last: NaiveDateTime,
}

fn buckets(labels: &[&str], counts: &[usize]) -> Vec<Bucket> {
    labels
        .iter()
        .zip(counts)
        .map(|(label, &count)| Bucket {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// Compute counts over `records`, listing the `top_n` most frequent contacts
///
/// Contacts with equal counts are ordered by name.
pub fn basic_statistics(records: &[Record], top_n: usize) -> BasicStatistics {
    let total = records.len();
    let mut contacts: HashMap<&str, ContactTally> = HashMap::new();
    let mut directions = DirectionCounts::default();
    let mut by_hour: BTreeMap<u32, usize> = (0..24).map(|h| (h, 0)).collect();
    let mut weekdays = [0usize; 7];
    let mut months = [0usize; 12];

    for record in records {
        let ts = record.timestamp;
        contacts
            .entry(record.contact.as_str())
            .and_modify(|t| {
                t.count += 1;
                t.first = t.first.min(ts);
                t.last = t.last.max(ts);
            })
            .or_insert(ContactTally {
                count: 1,
                first: ts,
                last: ts,
            });

        match record.direction {
            Direction::Sent => directions.sent += 1,
            Direction::Received => directions.received += 1,
        }

        *by_hour.entry(ts.hour()).or_insert(0) += 1;
        weekdays[ts.weekday().num_days_from_monday() as usize] += 1;
        months[ts.month0() as usize] += 1;
    }

    let date_range = records
        .iter()
        .map(|r| r.timestamp)
        .min()
        .zip(records.iter().map(|r| r.timestamp).max())
        .map(|(start, end)| DateRange {
            start,
            end,
            days: (end - start).num_days(),
        });

    let unique_contacts = contacts.len();
    let mut ranked: Vec<(&str, ContactTally)> = contacts.into_iter().collect();
    ranked.sort_by(|(a_name, a), (b_name, b)| b.count.cmp(&a.count).then(a_name.cmp(b_name)));

    let top_contacts = ranked
        .into_iter()
        .take(top_n)
        .map(|(contact, tally)| ContactSummary {
            contact: contact.to_string(),
            count: tally.count,
            percentage: tally.count as f64 * 100.0 / total as f64,
            first_contact: tally.first,
            last_contact: tally.last,
        })
        .collect();

    BasicStatistics {
        total_records: total,
        unique_contacts,
        message_frequency: date_range.as_ref().map(|r| MessageFrequency::new(total, r)),
        duration_stats: DurationStats::from_records(records),
        date_range,
        top_contacts,
        direction_counts: directions,
        by_hour,
        by_weekday: buckets(&WEEKDAYS, &weekdays),
        by_month: buckets(&MONTHS, &months),
    }
}

impl BasicStatistics {
    /// Weekday with the most messages; the earlier day wins a tie
    pub fn busiest_weekday(&self) -> Option<&str> {
        self.by_weekday
            .iter()
            .enumerate()
            .filter(|(_, b)| b.count > 0)
            .max_by(|(ia, a), (ib, b)| a.count.cmp(&b.count).then(ib.cmp(ia)))
            .map(|(_, b)| b.label.as_str())
    }
}
