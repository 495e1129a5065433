//! Time window bounding a batch reconciliation.

use chrono::{DateTime, Duration, Utc};

use crate::entry::CalendarEntry;

/// A UTC interval used to bound a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window from now until `days` days ahead.
    pub fn days_ahead(days: i64) -> TimeWindow {
        let now = Utc::now();
        TimeWindow {
            start: now,
            end: now + Duration::days(days),
        }
    }

    /// The smallest window covering every entry: min start to max end.
    /// Returns `None` for an empty set; an undefined window must never
    /// silently become "everything" or "nothing".
    pub fn spanning(entries: &[CalendarEntry]) -> Option<TimeWindow> {
        let start = entries.iter().map(|e| e.start.with_timezone(&Utc)).min()?;
        let end = entries.iter().map(|e| e.end.with_timezone(&Utc)).max()?;
        Some(TimeWindow { start, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::BusyStatus;
    use chrono::{FixedOffset, TimeZone};

    fn entry(start_hour: u32, end_hour: u32) -> CalendarEntry {
        let tz = FixedOffset::east_opt(0).unwrap();
        CalendarEntry {
            subject: "w".to_string(),
            start: tz.with_ymd_and_hms(2024, 6, 1, start_hour, 0, 0).unwrap(),
            end: tz.with_ymd_and_hms(2024, 6, 1, end_hour, 0, 0).unwrap(),
            location: String::new(),
            organizer: String::new(),
            busy_status: BusyStatus::Free,
            attendees: vec![],
            categories: vec![],
            category_colors: vec![],
            source_key: "k".to_string(),
        }
    }

    #[test]
    fn test_spanning_empty_is_none() {
        assert!(TimeWindow::spanning(&[]).is_none());
    }

    #[test]
    fn test_spanning_single_entry_is_exact() {
        let e = entry(9, 10);
        let window = TimeWindow::spanning(std::slice::from_ref(&e)).unwrap();
        assert_eq!(window.start, e.start.with_timezone(&Utc));
        assert_eq!(window.end, e.end.with_timezone(&Utc));
    }

    #[test]
    fn test_spanning_takes_min_start_and_max_end() {
        let entries = vec![entry(10, 11), entry(8, 9), entry(9, 15)];
        let window = TimeWindow::spanning(&entries).unwrap();
        assert_eq!(window.start, entries[1].start.with_timezone(&Utc));
        assert_eq!(window.end, entries[2].end.with_timezone(&Utc));
    }
}
