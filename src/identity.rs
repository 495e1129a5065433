//! Stable identity derivation for destination records.
//!
//! The destination forbids reusing an identifier even after deletion, so a
//! record's working id is its derived base id plus a decimal counter
//! suffix. All ids produced from one source key therefore share the same
//! fixed-length prefix, which is what the reconciler's membership test
//! keys on.

use std::collections::HashSet;

use crate::entry::CalendarEntry;
use crate::error::{CalBridgeError, CalBridgeResult};

/// Length of a derived base id: a BLAKE3 digest in lowercase hex.
/// Hex is a subset of the destination's base32hex id alphabet.
pub const BASE_ID_LEN: usize = 64;

/// Derive the destination-legal base id for a source key.
///
/// Deterministic across runs and process restarts, so repeated syncs find
/// the same destination record family instead of duplicating it.
pub fn derive_base_id(source_key: &str) -> String {
    blake3::hash(source_key.as_bytes()).to_hex().to_string()
}

/// The set of base ids a sync run expects to own, with a prefix-and-suffix
/// aware membership test.
///
/// A destination id belongs to a family iff it is a known base id followed
/// by a (possibly empty) all-digit counter suffix. Plain substring search
/// would also match a base id that happens to appear inside an unrelated
/// id; the fixed base length plus the digit check rules that out.
#[derive(Debug)]
pub struct IdFamily {
    bases: HashSet<String>,
}

impl IdFamily {
    /// Build the family for one run's source entries.
    ///
    /// Duplicate derived ids within a run are a programming error in the
    /// caller or the expander and fail loudly here.
    pub fn from_entries(entries: &[CalendarEntry]) -> CalBridgeResult<IdFamily> {
        let mut bases = HashSet::with_capacity(entries.len());
        for entry in entries {
            let base = derive_base_id(&entry.source_key);
            if !bases.insert(base) {
                return Err(CalBridgeError::IdentityCollision(format!(
                    "source key '{}' derived an id already claimed in this run",
                    entry.source_key
                )));
            }
        }
        Ok(IdFamily { bases })
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Whether a destination id is traceable to one of this run's entries.
    pub fn covers(&self, destination_id: &str) -> bool {
        if destination_id.len() < BASE_ID_LEN || !destination_id.is_char_boundary(BASE_ID_LEN) {
            return false;
        }
        let (base, suffix) = destination_id.split_at(BASE_ID_LEN);
        self.bases.contains(base) && suffix.chars().all(|c| c.is_ascii_digit())
    }
}
