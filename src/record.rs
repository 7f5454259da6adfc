//! Typed phone records built from a [`RawTable`] and a [`ColumnMapping`]
//!
//! Every row is parsed independently. A row whose timestamp, contact or
//! direction cannot be interpreted is left out and described by a
//! [`RowIssue`]; it never aborts the file.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

use crate::config::{DirectionConfig, TimestampConfig};
use crate::loader::RawTable;
use crate::mapping::ColumnMapping;

/// Message direction from the phone owner's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    /// Match a raw label against the configured vocabulary (case-insensitive)
    pub fn parse(raw: &str, labels: &DirectionConfig) -> Option<Self> {
        let raw = raw.trim();
        if labels.sent.iter().any(|l| l.trim().eq_ignore_ascii_case(raw)) {
            Some(Direction::Sent)
        } else if labels
            .received
            .iter()
            .any(|l| l.trim().eq_ignore_ascii_case(raw))
        {
            Some(Direction::Received)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Sent => "sent",
            Direction::Received => "received",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the input table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based data row number in the source (header excluded)
    pub row: usize,
    pub timestamp: NaiveDateTime,
    /// Contact as first written in the file; every spelling that normalizes
    /// to the same key (see [`normalize_contact`]) is shown this way
    pub contact: String,
    pub direction: Direction,
    pub content: Option<String>,
    /// Call length in seconds, when a duration column is mapped and readable
    pub duration_seconds: Option<f64>,
    /// Unmapped columns, by header name
    pub extra: BTreeMap<String, String>,
}

impl Record {
    /// Convenience constructor for already-typed data
    pub fn new(
        row: usize,
        timestamp: NaiveDateTime,
        contact: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            row,
            timestamp,
            contact: contact.into(),
            direction,
            content: None,
            duration_seconds: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Why a row was excluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    InvalidTimestamp { value: String },
    MissingContact,
    UnknownDirection { value: String },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::InvalidTimestamp { value } => write!(f, "invalid timestamp {:?}", value),
            IssueKind::MissingContact => write!(f, "missing contact"),
            IssueKind::UnknownDirection { value } => {
                write!(f, "unknown message direction {:?}", value)
            }
        }
    }
}

/// A malformed row that was left out of the analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub row: usize,
    #[serde(flatten)]
    pub kind: IssueKind,
}

/// Records parsed from one table plus the rows that were skipped
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub records: Vec<Record>,
    pub issues: Vec<RowIssue>,
}

impl RecordSet {
    /// Convert every row of `table` using `mapping`
    pub fn from_table(
        table: &RawTable,
        mapping: &ColumnMapping,
        directions: &DirectionConfig,
        timestamps: &TimestampConfig,
    ) -> Self {
        let mapped = mapping.mapped_indices();
        let mut set = RecordSet::default();
        let mut labels: HashMap<String, String> = HashMap::new();

        for (i, cells) in table.rows.iter().enumerate() {
            let row = i + 1;
            let cell = |index: usize| cells.get(index).map(|s| s.trim()).unwrap_or("");

            let raw_ts = cell(mapping.timestamp.index);
            let Some(timestamp) = parse_timestamp(raw_ts, &timestamps.formats) else {
                set.issues.push(RowIssue {
                    row,
                    kind: IssueKind::InvalidTimestamp {
                        value: raw_ts.to_string(),
                    },
                });
                continue;
            };

            let raw_contact = cell(mapping.phone_number.index);
            let key = normalize_contact(raw_contact);
            if key.is_empty() {
                set.issues.push(RowIssue {
                    row,
                    kind: IssueKind::MissingContact,
                });
                continue;
            }

            let raw_direction = cell(mapping.message_type.index);
            let Some(direction) = Direction::parse(raw_direction, directions) else {
                set.issues.push(RowIssue {
                    row,
                    kind: IssueKind::UnknownDirection {
                        value: raw_direction.to_string(),
                    },
                });
                continue;
            };

            let contact = labels
                .entry(key)
                .or_insert_with(|| raw_contact.to_string())
                .clone();

            let duration_seconds = mapping
                .duration
                .as_ref()
                .and_then(|c| parse_duration(cell(c.index)));

            let content = mapping
                .message_content
                .as_ref()
                .map(|c| cell(c.index).to_string())
                .filter(|s| !s.is_empty());

            let extra = table
                .headers
                .iter()
                .enumerate()
                .filter(|(index, _)| !mapped.contains(index))
                .filter_map(|(index, name)| {
                    cells.get(index).map(|value| (name.clone(), value.clone()))
                })
                .collect();

            set.records.push(Record {
                row,
                timestamp,
                contact,
                direction,
                content,
                duration_seconds,
                extra,
            });
        }

        if !set.issues.is_empty() {
            tracing::warn!(
                source = %table.source,
                skipped = set.issues.len(),
                "excluded malformed rows"
            );
        }
        set
    }
}

/// Parse a timestamp with the configured formats, then RFC 3339, then a bare date
pub fn parse_timestamp(raw: &str, formats: &[String]) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Seconds from `from` to `to` with microsecond precision (negative if `to` is earlier)
pub fn elapsed_seconds(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        // beyond ~292k years; milliseconds still fit
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

/// Parse a call length: plain seconds (`95`, `95.5`) or `[h:]mm:ss`
///
/// Blank, negative or unreadable values give `None`; the row itself is kept.
pub fn parse_duration(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.contains(':') {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() > 3 {
            return None;
        }
        return parts.iter().try_fold(0.0, |seconds, part| {
            let value: u32 = part.trim().parse().ok()?;
            Some(seconds * 60.0 + f64::from(value))
        });
    }

    raw.parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
}

fn phone_like() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?[\d\s().\-]*\d[\d\s().\-]*$").expect("valid regex"))
}

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[\s().\-]").expect("valid regex"))
}

/// Normalize a contact identifier
///
/// Phone-number-looking values lose their separators (`(555) 123-4567` →
/// `5551234567`, a leading `+` is kept); names and other identifiers are only
/// trimmed.
pub fn normalize_contact(raw: &str) -> String {
    let raw = raw.trim();
    if phone_like().is_match(raw) {
        separators().replace_all(raw, "").into_owned()
    } else {
        raw.to_string()
    }
}
