//! Column mapping: resolve spreadsheet headers to canonical fields
//!
//! Input files name their columns freely ("Date", "Phone Number",
//! "Direction", "To/From", ...). The mapper resolves each canonical [`Field`]
//! with a ranked matcher so the outcome never depends on column order alone:
//!
//! 1. an explicit override from the configuration, if present;
//! 2. otherwise the field's vocabulary is walked in declared order, and for
//!    each pattern an exact header match beats a substring match;
//! 3. remaining ties go to the leftmost column.
//!
//! A column claimed by an earlier field is never reused.

use serde::Serialize;
use thiserror::Error;

use crate::config::ColumnConfig;

/// Canonical fields the analysis understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Timestamp,
    PhoneNumber,
    MessageType,
    MessageContent,
    Duration,
}

impl Field {
    /// Resolution order
    pub const ALL: [Field; 5] = [
        Field::Timestamp,
        Field::PhoneNumber,
        Field::MessageType,
        Field::MessageContent,
        Field::Duration,
    ];

    /// Fields without which a file cannot be analyzed
    pub const REQUIRED: [Field; 3] = [Field::Timestamp, Field::PhoneNumber, Field::MessageType];

    pub fn name(self) -> &'static str {
        match self {
            Field::Timestamp => "timestamp",
            Field::PhoneNumber => "phone_number",
            Field::MessageType => "message_type",
            Field::MessageContent => "message_content",
            Field::Duration => "duration",
        }
    }

    pub fn is_required(self) -> bool {
        Field::REQUIRED.contains(&self)
    }
}

/// Required columns could not be identified
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Could not map required columns: {}", .missing.join(", "))]
pub struct MappingError {
    /// Canonical names of the fields left unresolved
    pub missing: Vec<String>,
}

impl MappingError {
    pub fn new(missing: Vec<String>) -> Self {
        Self { missing }
    }
}

/// A resolved column: header text plus position in the row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub name: String,
    pub index: usize,
}

/// Resolved correspondence between a file's headers and canonical fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub timestamp: ResolvedColumn,
    pub phone_number: ResolvedColumn,
    pub message_type: ResolvedColumn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_content: Option<ResolvedColumn>,
    /// Call length column, in seconds or `[h:]mm:ss`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<ResolvedColumn>,
}

impl ColumnMapping {
    /// Indices of every mapped column, used to tell extra columns apart
    pub fn mapped_indices(&self) -> Vec<usize> {
        let mut indices = vec![
            self.timestamp.index,
            self.phone_number.index,
            self.message_type.index,
        ];
        indices.extend(self.message_content.iter().map(|c| c.index));
        indices.extend(self.duration.iter().map(|c| c.index));
        indices
    }
}

/// Ranked matcher over a configured vocabulary
#[derive(Debug, Clone)]
pub struct ColumnMapper<'a> {
    columns: &'a ColumnConfig,
}

/// Sort key for a candidate; smaller wins
type Rank = (usize, bool, usize);

impl<'a> ColumnMapper<'a> {
    pub fn new(columns: &'a ColumnConfig) -> Self {
        Self { columns }
    }

    /// Resolve all fields against `headers`
    ///
    /// Returns a [`MappingError`] listing every required field that could not
    /// be matched.
    pub fn resolve(&self, headers: &[String]) -> Result<ColumnMapping, MappingError> {
        let mut claimed = vec![false; headers.len()];
        let mut resolved: [Option<ResolvedColumn>; 5] = Default::default();
        let mut missing = Vec::new();

        for (slot, field) in Field::ALL.into_iter().enumerate() {
            match self.resolve_field(field, headers, &claimed) {
                Some(index) => {
                    claimed[index] = true;
                    resolved[slot] = Some(ResolvedColumn {
                        name: headers[index].clone(),
                        index,
                    });
                }
                None if field.is_required() => missing.push(field.name().to_string()),
                None => {}
            }
        }

        let [timestamp, phone_number, message_type, message_content, duration] = resolved;
        match (timestamp, phone_number, message_type) {
            (Some(timestamp), Some(phone_number), Some(message_type)) => {
                let mapping = ColumnMapping {
                    timestamp,
                    phone_number,
                    message_type,
                    message_content,
                    duration,
                };
                tracing::debug!(?mapping, "resolved column mapping");
                Ok(mapping)
            }
            _ => Err(MappingError::new(missing)),
        }
    }

    fn resolve_field(&self, field: Field, headers: &[String], claimed: &[bool]) -> Option<usize> {
        if let Some(wanted) = self.columns.override_for(field) {
            // Overrides must name a real column; no fallback to heuristics.
            let wanted = wanted.trim();
            return headers
                .iter()
                .enumerate()
                .find(|(i, h)| !claimed[*i] && h.trim().eq_ignore_ascii_case(wanted))
                .map(|(i, _)| i);
        }

        let mut best: Option<(Rank, usize)> = None;
        for (index, header) in headers.iter().enumerate() {
            if claimed[index] {
                continue;
            }
            if let Some(rank) = self.rank(field, header, index) {
                if best.map_or(true, |(current, _)| rank < current) {
                    best = Some((rank, index));
                }
            }
        }
        best.map(|(_, index)| index)
    }

    fn rank(&self, field: Field, header: &str, index: usize) -> Option<Rank> {
        let header = header.trim().to_lowercase();
        if header.is_empty() {
            return None;
        }
        self.columns
            .patterns(field)
            .iter()
            .enumerate()
            .find_map(|(priority, pattern)| {
                let pattern = pattern.trim().to_lowercase();
                if pattern.is_empty() {
                    None
                } else if header == pattern {
                    Some((priority, false, index))
                } else if header.contains(&pattern) {
                    Some((priority, true, index))
                } else {
                    None
                }
            })
    }
}
