//! CLI argument parsing for phonestat

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text summary (default)
    Text,
    /// JSON document for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "phonestat")]
#[command(version)]
#[command(about = "Response-time and contact statistics for phone-record spreadsheets", long_about = None)]
pub struct Cli {
    /// Spreadsheet files to analyze (CSV, TSV, XLSX, XLS, ODS)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also export the outlier listing as CSV
    #[arg(long = "outliers-csv", value_name = "PATH")]
    pub outliers_csv: Option<PathBuf>,

    /// Worksheet to read from workbooks (default: first sheet)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Number of contacts in the top-contacts table
    #[arg(long = "top-contacts", value_name = "N")]
    pub top_contacts: Option<usize>,

    /// Outlier fence width in IQRs
    #[arg(long = "iqr-multiplier", value_name = "K")]
    pub iqr_multiplier: Option<f64>,

    /// Silence (minutes) that ends a conversation
    #[arg(long = "conversation-timeout", value_name = "MINUTES")]
    pub conversation_timeout: Option<u64>,

    /// Column holding the timestamp (skips name matching)
    #[arg(long = "timestamp-column", value_name = "NAME")]
    pub timestamp_column: Option<String>,

    /// Column holding the contact (skips name matching)
    #[arg(long = "contact-column", value_name = "NAME")]
    pub contact_column: Option<String>,

    /// Column holding the message direction (skips name matching)
    #[arg(long = "direction-column", value_name = "NAME")]
    pub direction_column: Option<String>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Configuration values given on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            top_contacts: self.top_contacts,
            iqr_multiplier: self.iqr_multiplier,
            conversation_timeout_minutes: self.conversation_timeout,
            timestamp_column: self.timestamp_column.clone(),
            contact_column: self.contact_column.clone(),
            direction_column: self.direction_column.clone(),
        }
    }
}
