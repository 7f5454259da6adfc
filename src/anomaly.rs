//! Anomalies derived from the response and reciprocity analyses
//!
//! Two kinds are reported: replies whose latency was flagged by the IQR
//! screen, and contacts whose exchange runs in one direction only. Each
//! anomaly carries a severity score in `[0, 1]`.

use serde::Serialize;

use crate::reciprocity::ReciprocityReport;
use crate::response::OutlierRecord;

/// Fixed score for a one-way relationship
pub const IMBALANCE_SEVERITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    ResponseTimeOutlier,
    ReciprocityImbalance,
}

/// Coarse bucket of the severity score, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AnomalySeverity {
    /// Score below 0.4
    Low,
    /// Score in [0.4, 0.8)
    Medium,
    /// Score 0.8 and above
    High,
}

impl AnomalySeverity {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            AnomalySeverity::High
        } else if score >= 0.4 {
            AnomalySeverity::Medium
        } else {
            AnomalySeverity::Low
        }
    }
}

/// Detected anomaly with metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub contact: String,
    pub description: String,
    /// Score in [0, 1]
    pub severity: f64,
    pub level: AnomalySeverity,
    /// Sent timestamp of the flagged reply, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_seconds: Option<f64>,
}

impl Anomaly {
    fn new(kind: AnomalyKind, contact: &str, description: String, severity: f64) -> Self {
        Self {
            kind,
            contact: contact.to_string(),
            description,
            severity,
            level: AnomalySeverity::from_score(severity),
            timestamp: None,
            response_time_seconds: None,
        }
    }
}

/// Severity of a latency relative to the mean: `min(1, |latency/mean - 1|)`
///
/// A zero mean gives the maximum score.
pub fn outlier_severity(latency: f64, mean: f64) -> f64 {
    if mean > 0.0 {
        (latency / mean - 1.0).abs().min(1.0)
    } else {
        1.0
    }
}

/// One anomaly per flagged reply
pub fn response_time_anomalies(outliers: &[OutlierRecord], mean: f64) -> Vec<Anomaly> {
    outliers
        .iter()
        .map(|outlier| {
            let latency = outlier.response_time_seconds;
            let mut anomaly = Anomaly::new(
                AnomalyKind::ResponseTimeOutlier,
                &outlier.contact,
                format!(
                    "Response time outlier ({:.0}s) for contact {}",
                    latency, outlier.contact
                ),
                outlier_severity(latency, mean),
            );
            anomaly.timestamp = outlier.sent_ts.clone();
            anomaly.response_time_seconds = Some(latency);
            anomaly
        })
        .collect()
}

/// One anomaly per contact with one-way traffic
pub fn reciprocity_anomalies(reciprocity: &ReciprocityReport) -> Vec<Anomaly> {
    reciprocity
        .one_sided()
        .map(|(contact, summary)| {
            Anomaly::new(
                AnomalyKind::ReciprocityImbalance,
                contact,
                format!(
                    "Communication with {} is highly unbalanced ({})",
                    contact,
                    summary.relationship_balance.as_str()
                ),
                IMBALANCE_SEVERITY,
            )
        })
        .collect()
}

/// All anomalies for a file, most severe first (stable for equal scores)
///
/// `mean_latency` is the average response time, `None` when nothing paired.
pub fn detect_anomalies(
    outliers: &[OutlierRecord],
    mean_latency: Option<f64>,
    reciprocity: &ReciprocityReport,
) -> Vec<Anomaly> {
    let mean = mean_latency.unwrap_or(0.0);
    let mut anomalies = response_time_anomalies(outliers, mean);
    anomalies.extend(reciprocity_anomalies(reciprocity));
    anomalies.sort_by(|a, b| b.severity.total_cmp(&a.severity));

    if !anomalies.is_empty() {
        tracing::info!(count = anomalies.len(), "detected anomalies");
    }
    anomalies
}
