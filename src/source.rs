//! Raw appointment records as the source calendar's access layer hands
//! them over.
//!
//! The source collaborator enumerates its store, restricts by date, and
//! produces these records pre-sorted by start time. Decoding rules for the
//! raw string fields (busy-status codes, attendee and category packing)
//! live here so the collaborator stays a thin enumeration shim.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entry::{BusyStatus, CalendarEntry};
use crate::error::{CalBridgeError, CalBridgeResult};

/// One raw appointment, recurring or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAppointment {
    pub subject: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub location: String,
    pub organizer: String,
    pub busy_status: BusyStatus,
    pub attendees: Vec<String>,
    pub categories: Vec<String>,
    pub category_colors: Vec<String>,
    /// The source's conversation id: stable for the logical appointment,
    /// but shared by every occurrence of a recurring series.
    pub conversation_id: String,
}

impl RawAppointment {
    /// Build the canonical entry for this record under the given identity
    /// key (the conversation id itself, or an expander-disambiguated one).
    pub fn entry_with_key(&self, source_key: String) -> CalBridgeResult<CalendarEntry> {
        let entry = CalendarEntry {
            subject: self.subject.clone(),
            start: self.start,
            end: self.end,
            location: self.location.clone(),
            organizer: self.organizer.clone(),
            busy_status: self.busy_status,
            attendees: self.attendees.clone(),
            categories: self.categories.clone(),
            category_colors: self.category_colors.clone(),
            source_key,
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// A record as produced by the source window enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceRecord {
    /// A plain appointment, keyed by its own conversation id.
    Single(RawAppointment),
    /// A recurring master plus its exception list.
    Recurring(RecurringSeries),
}

/// A recurring series: the master record, the pattern start date, the
/// dates on which the series has no occurrence (deleted instances and the
/// original slots of moved ones), and the exception records themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSeries {
    /// The first occurrence's fields; regular occurrences shift its times
    /// by whole days.
    pub master: RawAppointment,
    /// Date the pattern counts day offsets from.
    pub pattern_start: NaiveDate,
    /// Dates the source reports as having no occurrence.
    pub deleted_dates: HashSet<NaiveDate>,
    /// Occurrences whose fields were individually overridden or moved.
    pub exceptions: Vec<RawAppointment>,
}

/// Unpack the source's packed attendee strings: required attendees first,
/// then optional ones, each `"; "`-separated.
pub fn split_attendees(required: &str, optional: &str) -> Vec<String> {
    let split = |packed: &str| -> Vec<String> {
        if packed.is_empty() {
            Vec::new()
        } else {
            packed.split("; ").map(str::to_string).collect()
        }
    };
    let mut attendees = split(required);
    attendees.extend(split(optional));
    attendees
}

/// Unpack the source's `"."`-separated category string.
pub fn split_categories(packed: &str) -> Vec<String> {
    if packed.is_empty() {
        Vec::new()
    } else {
        packed.split('.').map(str::to_string).collect()
    }
}

/// Decode the source's numeric busy-status code, rejecting values outside
/// the documented table rather than guessing.
pub fn busy_status_from_code(code: u8) -> CalBridgeResult<BusyStatus> {
    BusyStatus::from_code(code)
        .ok_or_else(|| CalBridgeError::Source(format!("unknown busy status code {code}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_attendees_required_before_optional() {
        let attendees = split_attendees("ana@x.com; ben@x.com", "cleo@x.com");
        assert_eq!(attendees, vec!["ana@x.com", "ben@x.com", "cleo@x.com"]);
    }

    #[test]
    fn test_split_attendees_empty_strings() {
        assert!(split_attendees("", "").is_empty());
        assert_eq!(split_attendees("", "solo@x.com"), vec!["solo@x.com"]);
    }

    #[test]
    fn test_split_categories() {
        assert_eq!(split_categories("Work.Urgent"), vec!["Work", "Urgent"]);
        assert!(split_categories("").is_empty());
    }

    #[test]
    fn test_busy_status_code_bounds() {
        assert!(busy_status_from_code(2).is_ok());
        assert!(matches!(
            busy_status_from_code(9),
            Err(CalBridgeError::Source(_))
        ));
    }
}
