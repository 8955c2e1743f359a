//! Core data models for the church event feed
//!
//! This module contains the stored and expanded event shapes used throughout
//! the feed pipeline, plus validation for recurrence rules at the data-model
//! boundary.

pub mod remote;

pub use remote::{EventStore, HttpEventStore, StoreError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A declarative recurrence rule attached to an [`EventRecord`]
///
/// Describes a weekly repetition: "every `day_of_week` at `time`, starting
/// at `start_date`". An absent `end_date` means the rule recurs indefinitely
/// and is bounded only by the expansion horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    /// Day of the week the event repeats on (0 = Sunday .. 6 = Saturday)
    pub day_of_week: u8,
    /// First day the rule is in effect
    pub start_date: NaiveDate,
    /// Last day the rule is in effect, or `None` for "until further notice"
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Display time for each occurrence (e.g., "6:00 PM")
    pub time: String,
}

/// The canonical stored shape of an event, as held by the remote store
///
/// A record is either a one-off event (`date`, optionally multi-day via
/// `end_date`) or a recurrence rule (`is_recurring` with a
/// [`RecurrencePattern`]); for recurring records `date` is the rule's start
/// date, not a concrete occurrence. Field names follow the remote document
/// format (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Opaque unique identifier assigned by the remote store
    pub id: String,
    /// Event title
    pub title: String,
    /// Where the event takes place
    #[serde(default)]
    pub location: String,
    /// Category label (e.g., "Youth", "Worship")
    #[serde(default)]
    pub category: String,
    /// Longer display description
    #[serde(default)]
    pub description: String,
    /// Calendar date of the event (rule start date for recurring records)
    pub date: NaiveDate,
    /// Free-form display time string
    #[serde(default)]
    pub time: String,
    /// Whether this is a single contiguous multi-day occurrence
    #[serde(default)]
    pub is_multi_day: bool,
    /// Last day of a multi-day occurrence
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Whether this record is a recurrence rule
    #[serde(default)]
    pub is_recurring: bool,
    /// The recurrence rule, present when `is_recurring` is set
    #[serde(default)]
    pub recurrence_pattern: Option<RecurrencePattern>,
}

/// Ways a record's recurrence data can be unusable for expansion
///
/// A record with an issue contributes nothing to the feed; it is skipped
/// with a warning rather than aborting the expansion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceIssue {
    /// Record claims to be both multi-day and recurring; unsupported
    MultiDayRecurring,
    /// Record is marked recurring but carries no pattern
    MissingPattern,
    /// `day_of_week` is outside 0..=6
    InvalidDayOfWeek(u8),
    /// Pattern `end_date` is before its `start_date`
    InvertedRange,
}

impl std::fmt::Display for RecurrenceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrenceIssue::MultiDayRecurring => {
                write!(f, "record is both multi-day and recurring")
            }
            RecurrenceIssue::MissingPattern => {
                write!(f, "record is marked recurring but has no recurrence pattern")
            }
            RecurrenceIssue::InvalidDayOfWeek(d) => {
                write!(f, "day of week {} is outside 0..=6", d)
            }
            RecurrenceIssue::InvertedRange => {
                write!(f, "recurrence end date is before its start date")
            }
        }
    }
}

impl EventRecord {
    /// Checks the record's recurrence data for problems that make it
    /// unexpandable
    ///
    /// Returns `None` for non-recurring records and for recurring records
    /// with a well-formed pattern. Records must never carry both
    /// `is_multi_day` and `is_recurring`; that combination is reported here
    /// rather than silently reinterpreted as one or the other.
    pub fn recurrence_issue(&self) -> Option<RecurrenceIssue> {
        if !self.is_recurring {
            return None;
        }
        if self.is_multi_day {
            return Some(RecurrenceIssue::MultiDayRecurring);
        }
        let pattern = match &self.recurrence_pattern {
            Some(p) => p,
            None => return Some(RecurrenceIssue::MissingPattern),
        };
        if pattern.day_of_week > 6 {
            return Some(RecurrenceIssue::InvalidDayOfWeek(pattern.day_of_week));
        }
        if let Some(end) = pattern.end_date {
            if end < pattern.start_date {
                return Some(RecurrenceIssue::InvertedRange);
            }
        }
        None
    }
}

/// A single concrete, dated occurrence produced by expanding event records
///
/// Instances are recomputed on every feed load and never persisted. They
/// carry no identity of their own, only a back-reference to the record that
/// produced them. This is a distinct type from [`EventRecord`] so expanded
/// output can never be fed back into the expander.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventInstance {
    /// Id of the record this instance was expanded from
    pub record_id: String,
    /// Event title
    pub title: String,
    /// Where the event takes place
    pub location: String,
    /// Category label
    pub category: String,
    /// Longer display description
    pub description: String,
    /// The concrete calendar date of this occurrence
    pub date: NaiveDate,
    /// Last day of the occurrence, for multi-day events
    pub end_date: Option<NaiveDate>,
    /// Free-form display time string
    pub time: String,
    /// Whether this instance was materialized from a recurrence rule
    pub recurring: bool,
}

impl EventInstance {
    /// Builds the single instance for a non-recurring record
    pub(crate) fn from_record(record: &EventRecord) -> Self {
        Self {
            record_id: record.id.clone(),
            title: record.title.clone(),
            location: record.location.clone(),
            category: record.category.clone(),
            description: record.description.clone(),
            date: record.date,
            end_date: if record.is_multi_day {
                record.end_date
            } else {
                None
            },
            time: record.time.clone(),
            recurring: false,
        }
    }

    /// Builds one occurrence of a recurring record on a concrete date
    pub(crate) fn from_rule(
        record: &EventRecord,
        pattern: &RecurrencePattern,
        date: NaiveDate,
    ) -> Self {
        Self {
            record_id: record.id.clone(),
            title: record.title.clone(),
            location: record.location.clone(),
            category: record.category.clone(),
            description: record.description.clone(),
            date,
            end_date: None,
            time: pattern.time.clone(),
            recurring: true,
        }
    }
}
