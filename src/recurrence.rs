//! Recurrence expansion for event records
//!
//! Materializes a bounded sequence of concrete event instances from a mixed
//! collection of one-off, multi-day, and recurring records. Expansion is a
//! pure function: the reference date is an explicit parameter, so identical
//! inputs always produce identical output.

use chrono::{Datelike, Months, NaiveDate};
use tracing::warn;

use crate::data::{EventInstance, EventRecord, RecurrencePattern};

/// Expands event records into concrete dated instances
///
/// Non-recurring records pass through as a single instance each (multi-day
/// records keep their end date). Each recurring record yields one instance
/// per matching weekday between `max(start_date, today)` and
/// `min(end_date, horizon_end)` inclusive, where `horizon_end` is `today`
/// plus `horizon_months` calendar months.
///
/// Records with unusable recurrence data (invalid weekday, missing pattern,
/// inverted range, multi-day + recurring) are skipped with a warning; one
/// malformed rule never blanks the rest of the expansion.
pub fn expand(
    records: &[EventRecord],
    horizon_months: u32,
    today: NaiveDate,
) -> Vec<EventInstance> {
    let horizon_end = today
        .checked_add_months(Months::new(horizon_months))
        .unwrap_or(NaiveDate::MAX);

    let mut instances = Vec::new();

    for record in records {
        if let Some(issue) = record.recurrence_issue() {
            warn!(record_id = %record.id, %issue, "skipping unexpandable record");
            continue;
        }

        if !record.is_recurring {
            instances.push(EventInstance::from_record(record));
            continue;
        }

        // recurrence_issue() guarantees a well-formed pattern past this point
        let pattern = match &record.recurrence_pattern {
            Some(p) => p,
            None => continue,
        };

        expand_rule(record, pattern, today, horizon_end, &mut instances);
    }

    instances
}

/// Materializes every occurrence of one rule within the expansion window
fn expand_rule(
    record: &EventRecord,
    pattern: &RecurrencePattern,
    today: NaiveDate,
    horizon_end: NaiveDate,
    out: &mut Vec<EventInstance>,
) {
    let window_start = pattern.start_date.max(today);
    let window_end = pattern
        .end_date
        .map_or(horizon_end, |end| end.min(horizon_end));

    if window_end < window_start {
        return;
    }

    // Step to the first date in the window on the rule's weekday, then walk
    // forward a week at a time
    let target = u32::from(pattern.day_of_week);
    let offset = (target + 7 - window_start.weekday().num_days_from_sunday()) % 7;
    let mut date = window_start + chrono::Duration::days(i64::from(offset));

    while date <= window_end {
        out.push(EventInstance::from_rule(record, pattern, date));
        date = date + chrono::Duration::days(7);
    }
}
