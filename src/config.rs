//! Typed analyzer configuration
//!
//! All settings have defaults, so an empty TOML file (or none at all) is a
//! valid configuration. Command-line flags are applied on top through a single
//! [`AnalyzerConfig::merge`] call; there is no process-wide default instance.
//!
//! # Example phonestat.toml
//!
//! ```toml
//! [directions]
//! sent = ["sent", "outgoing"]
//! received = ["received", "incoming"]
//!
//! [columns.overrides]
//! timestamp = "Message Date"
//!
//! [response]
//! iqr_multiplier = 3.0
//!
//! [report]
//! top_contacts = 5
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::mapping::Field;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Root configuration, passed by reference through the whole pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub columns: ColumnConfig,
    pub directions: DirectionConfig,
    pub timestamps: TimestampConfig,
    pub response: ResponseConfig,
    pub conversation: ConversationConfig,
    pub reciprocity: ReciprocityConfig,
    pub report: ReportConfig,
}

/// Column-name vocabulary used by the column mapper
///
/// Each list is priority ordered: earlier patterns win over later ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnConfig {
    pub timestamp: Vec<String>,
    pub phone_number: Vec<String>,
    pub message_type: Vec<String>,
    pub message_content: Vec<String>,
    pub duration: Vec<String>,
    /// Exact column names that bypass the heuristics
    pub overrides: ColumnOverrides,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            timestamp: strings(&["timestamp", "datetime", "date", "time"]),
            phone_number: strings(&[
                "phone_number",
                "phone",
                "number",
                "contact",
                "to/from",
                "from",
                "to",
            ]),
            message_type: strings(&["message_type", "direction", "type"]),
            message_content: strings(&["content", "message", "text", "body"]),
            duration: strings(&["duration", "length"]),
            overrides: ColumnOverrides::default(),
        }
    }
}

impl ColumnConfig {
    /// Vocabulary for a canonical field
    pub fn patterns(&self, field: Field) -> &[String] {
        match field {
            Field::Timestamp => &self.timestamp,
            Field::PhoneNumber => &self.phone_number,
            Field::MessageType => &self.message_type,
            Field::MessageContent => &self.message_content,
            Field::Duration => &self.duration,
        }
    }

    /// Explicit column name configured for a field, if any
    pub fn override_for(&self, field: Field) -> Option<&str> {
        match field {
            Field::Timestamp => self.overrides.timestamp.as_deref(),
            Field::PhoneNumber => self.overrides.phone_number.as_deref(),
            Field::MessageType => self.overrides.message_type.as_deref(),
            Field::MessageContent => self.overrides.message_content.as_deref(),
            Field::Duration => self.overrides.duration.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnOverrides {
    pub timestamp: Option<String>,
    pub phone_number: Option<String>,
    pub message_type: Option<String>,
    pub message_content: Option<String>,
    pub duration: Option<String>,
}

/// Labels recognized as message directions (compared case-insensitively)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DirectionConfig {
    pub sent: Vec<String>,
    pub received: Vec<String>,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            sent: strings(&["sent", "outgoing", "outbound", "out"]),
            received: strings(&["received", "incoming", "inbound", "in"]),
        }
    }
}

/// Accepted timestamp layouts, tried in order (chrono `strftime` syntax)
///
/// `%.f` matches an optional fraction of a second. RFC 3339 and bare `%Y-%m-%d` dates are always accepted after these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimestampConfig {
    pub formats: Vec<String>,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            formats: strings(&[
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M",
                "%m/%d/%Y %H:%M:%S",
                "%m/%d/%Y %H:%M",
                "%d.%m.%Y %H:%M:%S",
            ]),
        }
    }
}

/// Response-time analysis settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResponseConfig {
    /// Replies faster than this count as quick responses
    pub quick_threshold_secs: f64,
    /// Replies slower than this count as delayed responses
    pub delayed_threshold_secs: f64,
    /// Fence width in IQRs for outlier detection (Tukey's k)
    pub iqr_multiplier: f64,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            quick_threshold_secs: 300.0,
            delayed_threshold_secs: 3600.0,
            iqr_multiplier: 1.5,
        }
    }
}

impl ResponseConfig {
    pub fn is_quick(&self, seconds: f64) -> bool {
        seconds < self.quick_threshold_secs
    }

    pub fn is_delayed(&self, seconds: f64) -> bool {
        seconds > self.delayed_threshold_secs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversationConfig {
    /// Silence longer than this starts a new conversation
    pub timeout_minutes: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: 60,
        }
    }
}

impl ConversationConfig {
    pub fn timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.timeout_minutes as i64)
    }
}

/// Sent-ratio thresholds for classifying relationship balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReciprocityConfig {
    pub balance_low: f64,
    pub balance_high: f64,
}

impl Default for ReciprocityConfig {
    fn default() -> Self {
        Self {
            balance_low: 0.4,
            balance_high: 0.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of contacts listed in the top-contacts table
    pub top_contacts: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_contacts: 10 }
    }
}

/// Values supplied on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub top_contacts: Option<usize>,
    pub iqr_multiplier: Option<f64>,
    pub conversation_timeout_minutes: Option<u64>,
    pub timestamp_column: Option<String>,
    pub contact_column: Option<String>,
    pub direction_column: Option<String>,
}

// Ten years; keeps chrono::Duration::minutes far from overflow.
const MAX_TIMEOUT_MINUTES: u64 = 10 * 366 * 24 * 60;

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    ///
    /// ```no_run
    /// use phonestat::config::AnalyzerConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = AnalyzerConfig::from_file("phonestat.toml")?;
    /// println!("IQR fence: {}x", config.response.iqr_multiplier);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load configuration from a TOML string; missing keys take defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalyzerConfig =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Apply command-line overrides on top of this configuration
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(n) = overrides.top_contacts {
            self.report.top_contacts = n;
        }
        if let Some(k) = overrides.iqr_multiplier {
            self.response.iqr_multiplier = k;
        }
        if let Some(minutes) = overrides.conversation_timeout_minutes {
            self.conversation.timeout_minutes = minutes;
        }
        if let Some(column) = overrides.timestamp_column {
            self.columns.overrides.timestamp = Some(column);
        }
        if let Some(column) = overrides.contact_column {
            self.columns.overrides.phone_number = Some(column);
        }
        if let Some(column) = overrides.direction_column {
            self.columns.overrides.message_type = Some(column);
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        for field in Field::REQUIRED {
            if self.columns.patterns(field).is_empty() && self.columns.override_for(field).is_none()
            {
                return Err(format!(
                    "columns.{} needs at least one pattern or an override",
                    field.name()
                ));
            }
        }

        if self.directions.sent.is_empty() || self.directions.received.is_empty() {
            return Err("directions.sent and directions.received must not be empty".to_string());
        }
        for label in &self.directions.sent {
            if self
                .directions
                .received
                .iter()
                .any(|r| r.eq_ignore_ascii_case(label))
            {
                return Err(format!(
                    "direction label {:?} is listed as both sent and received",
                    label
                ));
            }
        }

        if self.timestamps.formats.is_empty() {
            return Err("timestamps.formats must not be empty".to_string());
        }

        let response = &self.response;
        if !(response.iqr_multiplier.is_finite() && response.iqr_multiplier > 0.0) {
            return Err(format!(
                "response.iqr_multiplier must be > 0, got {}",
                response.iqr_multiplier
            ));
        }
        if !(response.quick_threshold_secs >= 0.0
            && response.quick_threshold_secs <= response.delayed_threshold_secs)
        {
            return Err(format!(
                "response thresholds must satisfy 0 <= quick ({}) <= delayed ({})",
                response.quick_threshold_secs, response.delayed_threshold_secs
            ));
        }

        if self.conversation.timeout_minutes == 0
            || self.conversation.timeout_minutes > MAX_TIMEOUT_MINUTES
        {
            return Err(format!(
                "conversation.timeout_minutes must be in [1, {}], got {}",
                MAX_TIMEOUT_MINUTES, self.conversation.timeout_minutes
            ));
        }

        let r = &self.reciprocity;
        if !(0.0..=1.0).contains(&r.balance_low)
            || !(0.0..=1.0).contains(&r.balance_high)
            || r.balance_low > r.balance_high
        {
            return Err(format!(
                "reciprocity balance must satisfy 0 <= low ({}) <= high ({}) <= 1",
                r.balance_low, r.balance_high
            ));
        }

        if self.report.top_contacts == 0 {
            return Err("report.top_contacts must be >= 1".to_string());
        }

        Ok(())
    }
}
