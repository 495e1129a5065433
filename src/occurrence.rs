//! Expansion of recurring source records into concrete per-date entries.
//!
//! A recurring master shares one conversation id across its whole series,
//! so every materialized occurrence gets a disambiguating key suffix
//! (`REG{day-offset}` for pattern occurrences, `EXP{index}` for exception
//! records) before identity derivation runs. Without the suffix, every
//! occurrence of a series would hash to the same destination id.

use std::collections::HashSet;

use chrono::Duration;
use tracing::debug;

use crate::entry::CalendarEntry;
use crate::error::{CalBridgeError, CalBridgeResult};
use crate::source::{RecurringSeries, SourceRecord};
use crate::window::TimeWindow;

/// Expand a window's source records into the flat entry sequence the
/// reconciler consumes.
///
/// Non-recurring records pass through unchanged, keyed by their own
/// conversation id. Output order is ascending by start time: the source
/// pre-sorts its record stream, regular occurrences are generated in day
/// order, and exception records are merged in at their insertion point
/// rather than re-sorting the whole sequence.
pub fn expand_records(
    records: &[SourceRecord],
    window: &TimeWindow,
) -> CalBridgeResult<Vec<CalendarEntry>> {
    let mut entries = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();

    for record in records {
        let produced = match record {
            SourceRecord::Single(raw) => {
                vec![raw.entry_with_key(raw.conversation_id.clone())?]
            }
            SourceRecord::Recurring(series) => expand_series(series, window)?,
        };

        for entry in produced {
            if !seen_keys.insert(entry.source_key.clone()) {
                return Err(CalBridgeError::IdentityCollision(format!(
                    "expansion produced key '{}' twice",
                    entry.source_key
                )));
            }
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// Expand one recurring series into its in-window occurrences.
fn expand_series(
    series: &RecurringSeries,
    window: &TimeWindow,
) -> CalBridgeResult<Vec<CalendarEntry>> {
    let master = &series.master;
    let mut occurrences = Vec::new();

    // Candidate day offsets from the pattern start, until the candidate
    // start leaves the window.
    let mut d: i64 = 0;
    loop {
        let occ_date = series.pattern_start + Duration::days(d);
        let occ_start = master.start + Duration::days(d);
        if occ_start.with_timezone(&chrono::Utc) >= window.end {
            break;
        }

        // A date the source marks as having no occurrence (deleted, or the
        // original slot of a moved instance) is an expected skip.
        if series.deleted_dates.contains(&occ_date) {
            debug!(date = %occ_date, key = %master.conversation_id, "no occurrence at date, skipping");
            d += 1;
            continue;
        }

        if occ_start.with_timezone(&chrono::Utc) < window.start {
            d += 1;
            continue;
        }

        let mut entry =
            master.entry_with_key(format!("{}REG{}", master.conversation_id, d))?;
        entry.start = occ_start;
        entry.end = master.end + Duration::days(d);
        occurrences.push(entry);
        d += 1;
    }

    // Exception records whose own times fall inside the window, keyed by
    // their position in the series' exception list.
    for (index, exception) in series.exceptions.iter().enumerate() {
        let starts_in = window.contains(exception.start.with_timezone(&chrono::Utc));
        let ends_in = window.contains(exception.end.with_timezone(&chrono::Utc));
        if !(starts_in && ends_in) {
            continue;
        }

        let entry =
            exception.entry_with_key(format!("{}EXP{}", master.conversation_id, index))?;
        let at = occurrences.partition_point(|existing| existing.start <= entry.start);
        occurrences.insert(at, entry);
    }

    Ok(occurrences)
}
