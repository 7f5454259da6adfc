//! Reciprocity: who writes to whom, and who starts conversations
//!
//! Per contact, messages are counted by direction and the sent ratio is
//! classified into a [`Balance`]. An *initiation* is the first message with a
//! contact, or any message arriving after more than the conversation timeout
//! of silence with that contact; it is attributed to the message's direction.

use chrono::Duration;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::ReciprocityConfig;
use crate::record::{Direction, Record};

/// Classification of a contact's sent ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Balance {
    OnlySent,
    OnlyReceived,
    MostlySent,
    MostlyReceived,
    Balanced,
}

impl Balance {
    pub fn classify(sent: usize, received: usize, thresholds: &ReciprocityConfig) -> Self {
        if received == 0 && sent > 0 {
            return Balance::OnlySent;
        }
        if sent == 0 && received > 0 {
            return Balance::OnlyReceived;
        }
        let total = sent + received;
        let ratio = if total > 0 {
            sent as f64 / total as f64
        } else {
            0.0
        };
        if ratio > thresholds.balance_high {
            Balance::MostlySent
        } else if ratio < thresholds.balance_low {
            Balance::MostlyReceived
        } else {
            Balance::Balanced
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Balance::OnlySent => "only_sent",
            Balance::OnlyReceived => "only_received",
            Balance::MostlySent => "mostly_sent",
            Balance::MostlyReceived => "mostly_received",
            Balance::Balanced => "balanced",
        }
    }

    /// True when the exchange is entirely one-way
    pub fn is_one_sided(self) -> bool {
        matches!(self, Balance::OnlySent | Balance::OnlyReceived)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactReciprocity {
    pub sent_messages: usize,
    pub received_messages: usize,
    pub total_messages: usize,
    pub sent_ratio: f64,
    pub relationship_balance: Balance,
    /// Initiations by the phone owner
    pub user_initiations: usize,
    /// Initiations by the contact
    pub contact_initiations: usize,
    pub total_initiations: usize,
    pub user_initiation_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReciprocityReport {
    /// Share of all initiations made by the phone owner; `None` without data
    pub overall_initiation_ratio: Option<f64>,
    pub contacts: BTreeMap<String, ContactReciprocity>,
}

impl ReciprocityReport {
    /// Contacts whose exchange is entirely one-way
    pub fn one_sided(&self) -> impl Iterator<Item = (&String, &ContactReciprocity)> {
        self.contacts
            .iter()
            .filter(|(_, c)| c.relationship_balance.is_one_sided())
    }
}

#[derive(Default)]
struct Counts {
    sent: usize,
    received: usize,
    sent_initiations: usize,
    received_initiations: usize,
}

impl Counts {
    fn count(&mut self, direction: Direction) {
        match direction {
            Direction::Sent => self.sent += 1,
            Direction::Received => self.received += 1,
        }
    }

    fn initiation(&mut self, direction: Direction) {
        match direction {
            Direction::Sent => self.sent_initiations += 1,
            Direction::Received => self.received_initiations += 1,
        }
    }
}

fn ratio(part: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| part as f64 / total as f64)
}

pub fn analyze_reciprocity(
    records: &[Record],
    timeout: Duration,
    thresholds: &ReciprocityConfig,
) -> ReciprocityReport {
    let mut ordered: Vec<&Record> = records.iter().collect();
    ordered.sort_by(|a, b| {
        a.contact
            .cmp(&b.contact)
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });

    let mut counts: BTreeMap<&str, Counts> = BTreeMap::new();
    let mut previous: Option<&Record> = None;

    for record in ordered {
        let entry = counts.entry(record.contact.as_str()).or_default();
        entry.count(record.direction);

        let starts_conversation = match previous {
            Some(prev) if prev.contact == record.contact => {
                record.timestamp - prev.timestamp > timeout
            }
            _ => true,
        };
        if starts_conversation {
            entry.initiation(record.direction);
        }
        previous = Some(record);
    }

    let mut user_total = 0;
    let mut all_total = 0;
    let contacts = counts
        .into_iter()
        .map(|(contact, c)| {
            let total = c.sent + c.received;
            let total_initiations = c.sent_initiations + c.received_initiations;
            user_total += c.sent_initiations;
            all_total += total_initiations;

            let summary = ContactReciprocity {
                sent_messages: c.sent,
                received_messages: c.received,
                total_messages: total,
                sent_ratio: ratio(c.sent, total).unwrap_or(0.0),
                relationship_balance: Balance::classify(c.sent, c.received, thresholds),
                user_initiations: c.sent_initiations,
                contact_initiations: c.received_initiations,
                total_initiations,
                user_initiation_ratio: ratio(c.sent_initiations, total_initiations),
            };
            (contact.to_string(), summary)
        })
        .collect();

    let report = ReciprocityReport {
        overall_initiation_ratio: ratio(user_total, all_total),
        contacts,
    };
    tracing::debug!(
        contacts = report.contacts.len(),
        overall_initiation_ratio = ?report.overall_initiation_ratio,
        "analyzed reciprocity"
    );
    report
}
