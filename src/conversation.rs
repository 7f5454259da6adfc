//! Conversation flows
//!
//! All records are ordered by timestamp (contacts interleaved) and split into
//! conversations wherever the silence between two consecutive records exceeds
//! the timeout. Each conversation is then summarized, and conversations of at
//! least three messages feed the sequence and turn-taking metrics.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::record::{elapsed_seconds, Direction, Record};
use crate::response::weekday_name;

/// Number of most common sequences reported
pub const TOP_SEQUENCES: usize = 5;

/// Consecutive messages in one direction at or above this length are monologues
pub const MONOLOGUE_LENGTH: usize = 5;

const SEQUENCE_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_seconds: f64,
    pub message_count: usize,
    /// Contacts in order of first appearance
    pub contacts: Vec<String>,
    pub initiator: Direction,
    pub terminator: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceCount {
    pub sequence: Vec<Direction>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TurnTaking {
    pub avg_user_turn_length: Option<f64>,
    pub avg_contact_turn_length: Option<f64>,
    pub max_user_turn_length: Option<usize>,
    pub max_contact_turn_length: Option<usize>,
    pub monologue_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationReport {
    pub conversation_count: usize,
    pub average_duration_seconds: Option<f64>,
    pub average_message_count: Option<f64>,
    /// Conversations per start hour
    pub by_start_hour: BTreeMap<u32, usize>,
    /// Conversations per start weekday
    pub by_start_day: BTreeMap<String, usize>,
    pub common_sequences: Vec<SequenceCount>,
    pub turn_taking: TurnTaking,
    pub conversations: Vec<Conversation>,
}

/// Split records into conversations separated by gaps longer than `timeout`
pub fn segment<'a>(records: &'a [Record], timeout: Duration) -> Vec<Vec<&'a Record>> {
    let mut ordered: Vec<&Record> = records.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let mut segments: Vec<Vec<&Record>> = Vec::new();
    for record in ordered {
        let continues = segments
            .last()
            .and_then(|current| current.last())
            .is_some_and(|prev| record.timestamp - prev.timestamp <= timeout);
        if continues {
            if let Some(current) = segments.last_mut() {
                current.push(record);
                continue;
            }
        }
        segments.push(vec![record]);
    }
    segments
}

fn summarize(messages: &[&Record]) -> Option<Conversation> {
    let first = messages.first()?;
    let last = messages.last()?;

    let mut contacts: Vec<String> = Vec::new();
    for record in messages {
        if !contacts.contains(&record.contact) {
            contacts.push(record.contact.clone());
        }
    }

    Some(Conversation {
        start: first.timestamp,
        end: last.timestamp,
        duration_seconds: elapsed_seconds(first.timestamp, last.timestamp),
        message_count: messages.len(),
        contacts,
        initiator: first.direction,
        terminator: last.direction,
    })
}

/// Lengths of runs of equal direction, in order
fn turns(directions: &[Direction]) -> Vec<(Direction, usize)> {
    let mut runs: Vec<(Direction, usize)> = Vec::new();
    for &direction in directions {
        if let Some((current, length)) = runs.last_mut() {
            if *current == direction {
                *length += 1;
                continue;
            }
        }
        runs.push((direction, 1));
    }
    runs
}

fn average(values: &[usize]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<usize>() as f64 / values.len() as f64)
}

pub fn analyze_conversations(records: &[Record], timeout: Duration) -> ConversationReport {
    let segments = segment(records, timeout);
    let conversations: Vec<Conversation> =
        segments.iter().filter_map(|s| summarize(s)).collect();

    let mut by_start_hour = BTreeMap::new();
    let mut by_start_day = BTreeMap::new();
    for conversation in &conversations {
        *by_start_hour.entry(conversation.start.hour()).or_insert(0) += 1;
        *by_start_day
            .entry(weekday_name(conversation.start.weekday()).to_string())
            .or_insert(0) += 1;
    }

    // Sequence tallies keep first-seen order so ties rank deterministically
    let mut sequence_counts: HashMap<Vec<Direction>, (usize, usize)> = HashMap::new();
    let mut user_turns = Vec::new();
    let mut contact_turns = Vec::new();

    for segment in segments.iter().filter(|s| s.len() >= SEQUENCE_LENGTH) {
        let directions: Vec<Direction> = segment.iter().map(|r| r.direction).collect();

        for window in directions.windows(SEQUENCE_LENGTH) {
            let next_rank = sequence_counts.len();
            sequence_counts
                .entry(window.to_vec())
                .or_insert((0, next_rank))
                .0 += 1;
        }

        for (direction, length) in turns(&directions) {
            match direction {
                Direction::Sent => user_turns.push(length),
                Direction::Received => contact_turns.push(length),
            }
        }
    }

    let mut ranked: Vec<(Vec<Direction>, (usize, usize))> = sequence_counts.into_iter().collect();
    ranked.sort_by(|(_, (a_count, a_seen)), (_, (b_count, b_seen))| {
        b_count.cmp(a_count).then(a_seen.cmp(b_seen))
    });
    let common_sequences = ranked
        .into_iter()
        .take(TOP_SEQUENCES)
        .map(|(sequence, (count, _))| SequenceCount { sequence, count })
        .collect();

    let turn_taking = TurnTaking {
        avg_user_turn_length: average(&user_turns),
        avg_contact_turn_length: average(&contact_turns),
        max_user_turn_length: user_turns.iter().copied().max(),
        max_contact_turn_length: contact_turns.iter().copied().max(),
        monologue_count: user_turns
            .iter()
            .chain(&contact_turns)
            .filter(|&&l| l >= MONOLOGUE_LENGTH)
            .count(),
    };

    let count = conversations.len();
    let durations: Vec<f64> = conversations.iter().map(|c| c.duration_seconds).collect();
    let report = ConversationReport {
        conversation_count: count,
        average_duration_seconds: crate::stats::mean(&durations),
        average_message_count: (count > 0).then(|| records.len() as f64 / count as f64),
        by_start_hour,
        by_start_day,
        common_sequences,
        turn_taking,
        conversations,
    };
    tracing::debug!(conversations = count, "analyzed conversation flows");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn rec(contact: &str, ts: NaiveDateTime, direction: Direction) -> Record {
        Record::new(0, ts, contact, direction)
    }

    use Direction::{Received as R, Sent as S};

    #[test]
    fn test_segment_by_timeout() {
        let records = vec![
            rec("a", at(1, 9, 0), R),
            rec("b", at(1, 9, 30), S),
            rec("a", at(1, 10, 30), S), // exactly 60 min later
            rec("a", at(1, 12, 0), R),
        ];
        let segments = segment(&records, Duration::minutes(60));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 3);
        assert_eq!(segments[1].len(), 1);
    }

    #[test]
    fn test_conversation_summary() {
        let records = vec![
            rec("a", at(1, 9, 0), R),
            rec("b", at(1, 9, 10), S),
            rec("a", at(1, 9, 20), S),
        ];
        let report = analyze_conversations(&records, Duration::minutes(60));

        assert_eq!(report.conversation_count, 1);
        let c = &report.conversations[0];
        assert_eq!(c.duration_seconds, 1200.0);
        assert_eq!(c.message_count, 3);
        assert_eq!(c.contacts, vec!["a", "b"]);
        assert_eq!(c.initiator, R);
        assert_eq!(c.terminator, S);
        assert_eq!(report.by_start_hour[&9], 1);
        assert_eq!(report.by_start_day["Monday"], 1);
    }

    #[test]
    fn test_common_sequences_ranked() {
        // R S R S in one conversation: RSR once, SRS once; then R S R alone
        let records = vec![
            rec("a", at(1, 9, 0), R),
            rec("a", at(1, 9, 1), S),
            rec("a", at(1, 9, 2), R),
            rec("a", at(1, 9, 3), S),
            rec("a", at(2, 9, 0), R),
            rec("a", at(2, 9, 1), S),
            rec("a", at(2, 9, 2), R),
        ];
        let report = analyze_conversations(&records, Duration::minutes(60));

        assert_eq!(report.common_sequences[0].sequence, vec![R, S, R]);
        assert_eq!(report.common_sequences[0].count, 2);
        assert_eq!(report.common_sequences[1].sequence, vec![S, R, S]);
        assert_eq!(report.common_sequences[1].count, 1);
    }

    #[test]
    fn test_short_conversations_skip_sequence_metrics() {
        let records = vec![rec("a", at(1, 9, 0), R), rec("a", at(1, 9, 1), S)];
        let report = analyze_conversations(&records, Duration::minutes(60));
        assert!(report.common_sequences.is_empty());
        assert_eq!(report.turn_taking, TurnTaking::default());
        assert_eq!(report.average_message_count, Some(2.0));
    }

    #[test]
    fn test_turn_taking_and_monologues() {
        let mut records: Vec<Record> = (0..5).map(|m| rec("a", at(1, 9, m), S)).collect();
        records.push(rec("a", at(1, 9, 10), R));
        records.push(rec("a", at(1, 9, 11), R));
        records.push(rec("a", at(1, 9, 12), S));

        let report = analyze_conversations(&records, Duration::minutes(60));
        let turns = &report.turn_taking;
        assert_eq!(turns.max_user_turn_length, Some(5));
        assert_eq!(turns.avg_user_turn_length, Some(3.0));
        assert_eq!(turns.avg_contact_turn_length, Some(2.0));
        assert_eq!(turns.max_contact_turn_length, Some(2));
        assert_eq!(turns.monologue_count, 1);
    }

    #[test]
    fn test_top_sequences_capped() {
        let pattern = [S, S, R, R, S, R, S, S, S, R, R, R, S];
        let records: Vec<Record> = pattern
            .iter()
            .enumerate()
            .map(|(i, &d)| rec("a", at(1, 10, i as u32), d))
            .collect();
        let report = analyze_conversations(&records, Duration::minutes(60));
        assert!(report.common_sequences.len() <= TOP_SEQUENCES);
    }

    #[test]
    fn test_no_records() {
        let report = analyze_conversations(&[], Duration::minutes(60));
        assert_eq!(report.conversation_count, 0);
        assert_eq!(report.average_duration_seconds, None);
        assert_eq!(report.average_message_count, None);
    }
}
