//! Per-file analysis pipeline
//!
//! Load, map columns, parse records, then run every analysis over the same
//! record set. A file that cannot be read or mapped yields a failed
//! [`FileOutcome`] instead of an error so that a batch over several files
//! always runs to the end.

use serde::Serialize;
use std::path::Path;

use crate::anomaly::{detect_anomalies, Anomaly};
use crate::basic_stats::{basic_statistics, BasicStatistics};
use crate::config::AnalyzerConfig;
use crate::conversation::{analyze_conversations, ConversationReport};
use crate::loader::{load_table, RawTable};
use crate::mapping::{ColumnMapper, ColumnMapping};
use crate::reciprocity::{analyze_reciprocity, ReciprocityReport};
use crate::record::{RecordSet, RowIssue};
use crate::response::{
    aggregate, flag_outliers, outlier_listing, pair_responses, response_details,
    AggregationResult, OutlierRecord, ResponseDetail,
};

/// Warning attached to a report without response pairs
pub const NO_PAIRS_WARNING: &str =
    "no received message was followed by a reply from the same contact";

/// Everything computed for one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub source: String,
    pub column_mapping: ColumnMapping,
    pub total_rows: usize,
    pub records_analyzed: usize,
    pub row_issues: Vec<RowIssue>,
    pub warnings: Vec<String>,
    pub basic_statistics: BasicStatistics,
    /// `None` when no response pairs were found
    pub response_times: Option<AggregationResult>,
    /// Every response pair with its outlier, quick and delayed flags
    pub response_details: Vec<ResponseDetail>,
    pub outliers: Vec<OutlierRecord>,
    pub reciprocity: ReciprocityReport,
    pub conversations: ConversationReport,
    pub anomalies: Vec<Anomaly>,
}

/// Result of analyzing one input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Analyzed(Box<FileReport>),
    /// Required columns could not be identified
    MappingFailed { source: String, message: String },
    /// The file could not be opened or decoded
    Unreadable { source: String, message: String },
}

impl FileOutcome {
    pub fn source(&self) -> &str {
        match self {
            FileOutcome::Analyzed(report) => &report.source,
            FileOutcome::MappingFailed { source, .. } | FileOutcome::Unreadable { source, .. } => {
                source
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Analyzed(_))
    }

    pub fn report(&self) -> Option<&FileReport> {
        match self {
            FileOutcome::Analyzed(report) => Some(report),
            _ => None,
        }
    }
}

/// Analyze a spreadsheet on disk
pub fn analyze_file(path: &Path, sheet: Option<&str>, config: &AnalyzerConfig) -> FileOutcome {
    match load_table(path, sheet) {
        Ok(table) => analyze_table(&table, config),
        Err(e) => {
            tracing::warn!(source = %path.display(), error = %e, "failed to read file");
            FileOutcome::Unreadable {
                source: path.display().to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// Analyze an already-loaded table
pub fn analyze_table(table: &RawTable, config: &AnalyzerConfig) -> FileOutcome {
    let mapping = match ColumnMapper::new(&config.columns).resolve(&table.headers) {
        Ok(mapping) => mapping,
        Err(e) => {
            tracing::warn!(source = %table.source, error = %e, "column mapping failed");
            return FileOutcome::MappingFailed {
                source: table.source.clone(),
                message: e.to_string(),
            };
        }
    };

    let set = RecordSet::from_table(table, &mapping, &config.directions, &config.timestamps);
    let records = &set.records;
    let mut warnings = Vec::new();

    let pairs = pair_responses(records);
    let response_times = aggregate(&pairs, &config.response);
    if response_times.is_none() {
        tracing::warn!(source = %table.source, "no response pairs found");
        warnings.push(NO_PAIRS_WARNING.to_string());
    }

    let flags = flag_outliers(&pairs, config.response.iqr_multiplier);
    let outliers = outlier_listing(&pairs, &flags);
    let details = response_details(&pairs, &flags, &config.response);

    let timeout = config.conversation.timeout();
    let reciprocity = analyze_reciprocity(records, timeout, &config.reciprocity);
    let conversations = analyze_conversations(records, timeout);
    let anomalies = detect_anomalies(
        &outliers,
        response_times
            .as_ref()
            .map(|r| r.average_response_time_seconds),
        &reciprocity,
    );

    tracing::info!(
        source = %table.source,
        records = records.len(),
        skipped = set.issues.len(),
        pairs = pairs.len(),
        outliers = outliers.len(),
        "analyzed file"
    );

    FileOutcome::Analyzed(Box::new(FileReport {
        source: table.source.clone(),
        column_mapping: mapping,
        total_rows: table.len(),
        records_analyzed: records.len(),
        basic_statistics: basic_statistics(records, config.report.top_contacts),
        row_issues: set.issues,
        warnings,
        response_times,
        response_details: details,
        outliers,
        reciprocity,
        conversations,
        anomalies,
    }))
}
