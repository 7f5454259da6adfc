// Response-time analysis
//
// Pairs each received message with the reply that immediately follows it for
// the same contact, then summarizes and screens the resulting latencies:
//
// - pairing: (contact, received, sent, latency) tuples from the record log
// - aggregate: mean, median, distribution and per-contact/hour/weekday means
// - outliers: IQR screening of latencies and the outlier listing
// - details: every pair with its outlier, quick and delayed flags
//
// Every stage takes its input by reference and returns fresh values, so a
// stage can be rerun without affecting the others.

mod aggregate;
mod details;
mod outliers;
mod pairing;

pub use aggregate::{aggregate, weekday_name, AggregationResult, WEEKDAYS};
pub use details::{response_details, ResponseDetail};
pub use outliers::{flag_outliers, outlier_listing, OutlierRecord, TIMESTAMP_FORMAT};
pub use pairing::{pair_responses, ResponsePair};
