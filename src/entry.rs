//! The canonical in-memory representation of one appointment.
//!
//! Entries are built fresh on every sync run from the source's raw records
//! and are never mutated in place; a changed appointment produces a new
//! entry that supersedes the old destination record via upsert.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{CalBridgeError, CalBridgeResult};

/// One appointment, provider-neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub subject: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,

    pub location: String,
    pub organizer: String,
    pub busy_status: BusyStatus,

    /// Required attendees followed by optional attendees, as the source
    /// produced them.
    pub attendees: Vec<String>,
    pub categories: Vec<String>,
    /// Hex colors (`#RRGGBB`), index-aligned with `categories`.
    pub category_colors: Vec<String>,

    /// The source system's stable-but-not-unique key for the logical
    /// appointment. Occurrences of a recurring series carry a
    /// disambiguating suffix appended by the expander.
    pub source_key: String,
}

impl CalendarEntry {
    /// Check the structural invariants: `start <= end` and one color per
    /// category.
    pub fn validate(&self) -> CalBridgeResult<()> {
        if self.start > self.end {
            return Err(CalBridgeError::Source(format!(
                "entry '{}' starts after it ends ({} > {})",
                self.subject, self.start, self.end
            )));
        }
        if self.categories.len() != self.category_colors.len() {
            return Err(CalBridgeError::Source(format!(
                "entry '{}' has {} categories but {} category colors",
                self.subject,
                self.categories.len(),
                self.category_colors.len()
            )));
        }
        Ok(())
    }
}

/// Busy status as the source's appointment model defines it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusyStatus {
    Free,
    Tentative,
    Busy,
    OutOfOffice,
    WorkingElsewhere,
}

impl BusyStatus {
    /// Decode the source's numeric busy-status code (OlBusyStatus).
    pub fn from_code(code: u8) -> Option<BusyStatus> {
        match code {
            0 => Some(BusyStatus::Free),
            1 => Some(BusyStatus::Tentative),
            2 => Some(BusyStatus::Busy),
            3 => Some(BusyStatus::OutOfOffice),
            4 => Some(BusyStatus::WorkingElsewhere),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusyStatus::Free => "Free",
            BusyStatus::Tentative => "Tentative",
            BusyStatus::Busy => "Busy",
            BusyStatus::OutOfOffice => "OutOfOffice",
            BusyStatus::WorkingElsewhere => "WorkingElsewhere",
        }
    }

    pub fn from_name(name: &str) -> Option<BusyStatus> {
        match name {
            "Free" => Some(BusyStatus::Free),
            "Tentative" => Some(BusyStatus::Tentative),
            "Busy" => Some(BusyStatus::Busy),
            "OutOfOffice" => Some(BusyStatus::OutOfOffice),
            "WorkingElsewhere" => Some(BusyStatus::WorkingElsewhere),
            _ => None,
        }
    }

    /// Only genuinely free time should render as free on the destination
    /// calendar; anything tentative or busier blocks it.
    pub fn transparency(&self) -> Transparency {
        match self {
            BusyStatus::Free => Transparency::Transparent,
            BusyStatus::Tentative
            | BusyStatus::Busy
            | BusyStatus::OutOfOffice
            | BusyStatus::WorkingElsewhere => Transparency::Opaque,
        }
    }
}

/// Whether an event blocks time (OPAQUE) or shows as free (TRANSPARENT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transparency {
    Opaque,
    Transparent,
}

impl Transparency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transparency::Opaque => "opaque",
            Transparency::Transparent => "transparent",
        }
    }
}
