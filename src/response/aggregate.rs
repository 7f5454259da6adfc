// Time aggregation over response pairs
//
// Hour and weekday buckets use the reply (sent) timestamp.

use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::ResponseConfig;
use crate::response::pairing::ResponsePair;
use crate::stats::{self, DistributionStats};

/// Weekday names in calendar order, Monday first
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAYS[weekday.num_days_from_monday() as usize]
}

/// Summary of response latencies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub pair_count: usize,
    pub average_response_time_seconds: f64,
    pub median_response_time_seconds: f64,
    pub response_time_distribution: DistributionStats,
    /// Mean latency per contact
    pub per_contact_average: BTreeMap<String, f64>,
    /// Mean latency per hour of day (0-23); only hours with replies appear
    pub by_hour_average: BTreeMap<u32, f64>,
    /// Mean latency per weekday name; only days with replies appear
    pub by_day_average: BTreeMap<String, f64>,
    /// Replies faster than the quick threshold
    pub quick_responses: usize,
    /// Replies slower than the delayed threshold
    pub delayed_responses: usize,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

fn means<K: Ord>(groups: BTreeMap<K, Accumulator>) -> BTreeMap<K, f64> {
    groups.into_iter().map(|(k, acc)| (k, acc.mean())).collect()
}

/// Aggregate latencies; `None` when there are no pairs
pub fn aggregate(pairs: &[ResponsePair], config: &ResponseConfig) -> Option<AggregationResult> {
    let latencies: Vec<f64> = pairs.iter().map(|p| p.response_time_seconds).collect();
    let distribution = DistributionStats::from_values(&latencies)?;
    let median = stats::median(&latencies)?;

    let mut per_contact: BTreeMap<String, Accumulator> = BTreeMap::new();
    let mut by_hour: BTreeMap<u32, Accumulator> = BTreeMap::new();
    let mut by_day: BTreeMap<String, Accumulator> = BTreeMap::new();

    for pair in pairs {
        let latency = pair.response_time_seconds;
        per_contact
            .entry(pair.contact.clone())
            .or_default()
            .add(latency);
        by_hour.entry(pair.sent_at.hour()).or_default().add(latency);
        by_day
            .entry(weekday_name(pair.sent_at.weekday()).to_string())
            .or_default()
            .add(latency);
    }

    Some(AggregationResult {
        pair_count: pairs.len(),
        average_response_time_seconds: distribution.mean,
        median_response_time_seconds: median,
        response_time_distribution: distribution,
        per_contact_average: means(per_contact),
        by_hour_average: means(by_hour),
        by_day_average: means(by_day),
        quick_responses: latencies
            .iter()
            .filter(|&&l| config.is_quick(l))
            .count(),
        delayed_responses: latencies
            .iter()
            .filter(|&&l| config.is_delayed(l))
            .count(),
    })
}
