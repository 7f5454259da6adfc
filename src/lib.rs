//! phonestat - statistics for phone-record spreadsheets
//!
//! This library reads CSV and Excel/OpenDocument exports of calls and text
//! messages, works out which columns hold the timestamp, the contact and the
//! message direction, and computes contact statistics, reply latencies with
//! IQR outlier screening, reciprocity and conversation-flow metrics.
//!
//! ```no_run
//! use phonestat::analyzer::{analyze_file, FileOutcome};
//! use phonestat::config::AnalyzerConfig;
//! use std::path::Path;
//!
//! let config = AnalyzerConfig::default();
//! if let FileOutcome::Analyzed(report) = analyze_file(Path::new("messages.csv"), None, &config) {
//!     if let Some(times) = &report.response_times {
//!         println!("median reply: {:.0}s", times.median_response_time_seconds);
//!     }
//! }
//! ```

pub mod analyzer;
pub mod anomaly;
pub mod basic_stats;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod csv_output;
pub mod error;
pub mod loader;
pub mod mapping;
pub mod reciprocity;
pub mod record;
pub mod report;
pub mod response;
pub mod stats;

pub use error::{Error, Result};
