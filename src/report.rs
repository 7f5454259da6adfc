//! Report rendering: JSON document and plain-text summary

use serde::Serialize;
use std::fmt::{self, Write};

use crate::analyzer::{FileOutcome, FileReport};
use crate::response::WEEKDAYS;

/// Run-level counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub analyzed: usize,
    pub failed: usize,
}

/// Complete JSON document for one run
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub summary: RunSummary,
    pub files: Vec<FileOutcome>,
}

impl JsonReport {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "phonestat-json-v1".to_string(),
            summary: RunSummary::default(),
            files: Vec::new(),
        }
    }

    pub fn add_outcome(&mut self, outcome: FileOutcome) {
        self.summary.files += 1;
        if outcome.is_success() {
            self.summary.analyzed += 1;
        } else {
            self.summary.failed += 1;
        }
        self.files.push(outcome);
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for JsonReport {
    fn default() -> Self {
        Self::new()
    }
}

fn or_null(value: Option<&str>) -> &str {
    value.unwrap_or("null")
}

fn seconds(value: f64) -> String {
    format!("{:.1}s", value)
}

/// Human-readable summary of every outcome
pub fn render_text(outcomes: &[FileOutcome]) -> String {
    let mut out = String::new();
    for (i, outcome) in outcomes.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing into a String cannot fail
        let _ = match outcome {
            FileOutcome::Analyzed(report) => write_report(&mut out, report),
            FileOutcome::MappingFailed { source, message } => {
                writeln!(out, "== {} ==\nmapping failed: {}", source, message)
            }
            FileOutcome::Unreadable { source, message } => {
                writeln!(out, "== {} ==\nunreadable: {}", source, message)
            }
        };
    }
    out
}

fn write_report(out: &mut String, report: &FileReport) -> fmt::Result {
    let stats = &report.basic_statistics;
    writeln!(out, "== {} ==", report.source)?;
    writeln!(
        out,
        "records: {} analyzed, {} skipped ({} rows)",
        report.records_analyzed,
        report.row_issues.len(),
        report.total_rows
    )?;
    let mapping = &report.column_mapping;
    writeln!(
        out,
        "columns: timestamp={:?} contact={:?} direction={:?}",
        mapping.timestamp.name, mapping.phone_number.name, mapping.message_type.name
    )?;
    for issue in &report.row_issues {
        writeln!(out, "  row {}: {}", issue.row, issue.kind)?;
    }

    if let Some(range) = &stats.date_range {
        writeln!(
            out,
            "date range: {} to {} ({} days)",
            range.start, range.end, range.days
        )?;
    }
    writeln!(
        out,
        "direction: {} sent, {} received",
        stats.direction_counts.sent, stats.direction_counts.received
    )?;
    if let Some(day) = stats.busiest_weekday() {
        writeln!(out, "busiest weekday: {}", day)?;
    }
    if let Some(freq) = &stats.message_frequency {
        writeln!(
            out,
            "messages per day {:.2}  per week {:.2}  per month {:.2}",
            freq.per_day, freq.per_week, freq.per_month
        )?;
    }
    if let Some(d) = &stats.duration_stats {
        writeln!(
            out,
            "durations ({} records): total {}  average {}  median {}  min {}  max {}",
            d.count,
            seconds(d.total_seconds),
            seconds(d.average_seconds),
            seconds(d.median_seconds),
            seconds(d.min_seconds),
            seconds(d.max_seconds)
        )?;
    }

    if !stats.top_contacts.is_empty() {
        writeln!(out, "\ntop contacts:")?;
        for c in &stats.top_contacts {
            writeln!(
                out,
                "  {:<20} {:>6} {:>6.1}%  {} .. {}",
                c.contact, c.count, c.percentage, c.first_contact, c.last_contact
            )?;
        }
    }

    match &report.response_times {
        Some(times) => {
            let d = &times.response_time_distribution;
            writeln!(out, "\nresponse times ({} pairs):", times.pair_count)?;
            writeln!(
                out,
                "  average {}  median {}  std dev {}",
                seconds(times.average_response_time_seconds),
                seconds(times.median_response_time_seconds),
                seconds(d.std_dev)
            )?;
            writeln!(
                out,
                "  min {}  q1 {}  q3 {}  iqr {}  p95 {}  max {}",
                seconds(d.min),
                seconds(d.q1),
                seconds(d.q3),
                seconds(d.iqr()),
                seconds(d.p95),
                seconds(d.max)
            )?;
            writeln!(
                out,
                "  quick: {}  delayed: {}",
                times.quick_responses, times.delayed_responses
            )?;
            for day in WEEKDAYS {
                if let Some(avg) = times.by_day_average.get(day) {
                    writeln!(out, "  {:<10} {}", day, seconds(*avg))?;
                }
            }
        }
        None => {
            writeln!(out, "\nresponse times: null")?;
        }
    }

    if !report.outliers.is_empty() {
        writeln!(out, "\noutliers:")?;
        for o in &report.outliers {
            writeln!(
                out,
                "  {} received={} sent={} {}",
                o.contact,
                or_null(o.received_ts.as_deref()),
                or_null(o.sent_ts.as_deref()),
                seconds(o.response_time_seconds)
            )?;
        }
    }

    let conv = &report.conversations;
    writeln!(out, "\nconversations: {}", conv.conversation_count)?;
    if let Some(ratio) = report.reciprocity.overall_initiation_ratio {
        writeln!(out, "user initiation ratio: {:.2}", ratio)?;
    }

    if !report.anomalies.is_empty() {
        writeln!(out, "\nanomalies:")?;
        for a in &report.anomalies {
            writeln!(out, "  [{:?}] {}", a.level, a.description)?;
        }
    }

    for warning in &report.warnings {
        writeln!(out, "warning: {}", warning)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_table;
    use crate::config::AnalyzerConfig;
    use crate::loader::RawTable;

    fn outcome(csv: &str) -> FileOutcome {
        let table = RawTable::from_csv_str("calls.csv", csv).unwrap();
        analyze_table(&table, &AnalyzerConfig::default())
    }

    fn paired() -> FileOutcome {
        outcome(
            "timestamp,phone_number,message_type\n\
             2024-01-01 12:00:00,555-1234,received\n\
             2024-01-01 12:05:00,555-1234,sent\n",
        )
    }

    #[test]
    fn test_json_report_creation() {
        let report = JsonReport::new();
        assert_eq!(report.format, "phonestat-json-v1");
        assert!(report.files.is_empty());
        assert_eq!(report.summary, RunSummary::default());
    }

    #[test]
    fn test_json_report_counts_outcomes() {
        let mut report = JsonReport::new();
        report.add_outcome(paired());
        report.add_outcome(FileOutcome::Unreadable {
            source: "missing.csv".to_string(),
            message: "not found".to_string(),
        });

        assert_eq!(report.summary.files, 2);
        assert_eq!(report.summary.analyzed, 1);
        assert_eq!(report.summary.failed, 1);
    }

    #[test]
    fn test_json_response_time_keys() {
        let mut report = JsonReport::new();
        report.add_outcome(paired());
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        let file = &json["files"][0];
        assert_eq!(file["status"], "analyzed");
        let times = &file["response_times"];
        for key in [
            "average_response_time_seconds",
            "median_response_time_seconds",
            "response_time_distribution",
            "per_contact_average",
            "by_hour_average",
            "by_day_average",
        ] {
            assert!(times.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(times["average_response_time_seconds"], 300.0);
        assert_eq!(times["by_hour_average"]["12"], 300.0);
        assert!(file["outliers"].as_array().unwrap().is_empty());
        let details = file["response_details"].as_array().unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0]["contact"], "555-1234");
        assert_eq!(details[0]["is_outlier"], false);
    }

    #[test]
    fn test_json_null_response_times_without_pairs() {
        let mut report = JsonReport::new();
        report.add_outcome(outcome(
            "timestamp,phone_number,message_type\n2024-01-01 12:00:00,555,sent\n",
        ));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert!(json["files"][0]["response_times"].is_null());
        assert_eq!(json["files"][0]["warnings"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_text_summary() {
        let text = render_text(&[paired()]);
        assert!(text.contains("== calls.csv =="));
        assert!(text.contains("response times (1 pairs)"));
        assert!(text.contains("average 300.0s"));
        assert!(text.contains("iqr 0.0s"));
        assert!(text.contains("Monday"));
        assert!(text.contains("messages per day 2.00"));
        assert!(!text.contains("durations"));
    }

    #[test]
    fn test_text_duration_summary() {
        let text = render_text(&[outcome(
            "timestamp,phone_number,message_type,duration\n\
             2024-01-01 12:00:00,555,sent,1:30\n\
             2024-01-01 13:00:00,555,sent,30\n",
        )]);
        assert!(text.contains("durations (2 records): total 120.0s  average 60.0s"));
    }

    #[test]
    fn test_text_failure_lines() {
        let text = render_text(&[FileOutcome::MappingFailed {
            source: "x.csv".to_string(),
            message: "Could not map required columns: timestamp".to_string(),
        }]);
        assert!(text.contains("mapping failed: Could not map required columns"));
    }

    #[test]
    fn test_or_null() {
        assert_eq!(or_null(None), "null");
        assert_eq!(or_null(Some("2024-01-01T00:00:00")), "2024-01-01T00:00:00");
    }
}
