//! The upsert engine and full-window reconciler.
//!
//! All correctness here comes from deterministic, idempotent identity
//! derivation: the destination is a network-owned mutable resource with no
//! locking, and a failed run must leave it in a state a later successful
//! run fully repairs.

use std::collections::{BTreeMap, HashSet};

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::color::closest_color_id;
use crate::config::SyncConfig;
use crate::destination::{Destination, DestinationError, DestinationEvent};
use crate::entry::CalendarEntry;
use crate::error::{CalBridgeError, CalBridgeResult};
use crate::identity::{derive_base_id, IdFamily};
use crate::window::TimeWindow;

/// What a reconcile run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub window: TimeWindow,
    pub deleted: usize,
    pub upserted: usize,
}

/// One sync run's engine: a constructor-injected destination plus a
/// lazily-fetched palette cache (read-only after first use).
pub struct SyncEngine<D: Destination> {
    destination: D,
    config: SyncConfig,
    palette: OnceCell<BTreeMap<String, String>>,
}

impl<D: Destination> SyncEngine<D> {
    pub fn new(destination: D, config: SyncConfig) -> Self {
        SyncEngine {
            destination,
            config,
            palette: OnceCell::new(),
        }
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    async fn palette(&self) -> CalBridgeResult<&BTreeMap<String, String>> {
        self.palette
            .get_or_try_init(|| async { self.destination.list_palette().await })
            .await
            .map_err(CalBridgeError::from)
    }

    /// Find a currently-unoccupied id near `base_id` and claim it.
    ///
    /// The destination never frees an identifier, so the candidate counter
    /// climbs past every id earlier runs used up. With `delete_if_exists`,
    /// each occupied-but-resolvable predecessor is deleted on the way:
    /// resolving an identity deliberately removes the superseded records
    /// from earlier syncs. Terminates in practice; callers needing a hard
    /// bound impose one externally.
    pub async fn resolve_and_claim(
        &self,
        base_id: &str,
        delete_if_exists: bool,
    ) -> CalBridgeResult<String> {
        let mut i: u64 = 0;
        loop {
            let candidate = format!("{base_id}{i}");
            match self.destination.get(&candidate).await {
                Err(DestinationError::NotFound) => {
                    info!(event_id = %candidate, "claimed destination id");
                    return Ok(candidate);
                }
                Err(other) => return Err(other.into()),
                Ok(existing) => {
                    if delete_if_exists {
                        match self.destination.delete(&existing).await {
                            Err(DestinationError::Gone) => {
                                debug!(event_id = %candidate, "predecessor already deleted");
                            }
                            other => other?,
                        }
                    }
                    i += 1;
                }
            }
        }
    }

    /// Create-or-replace the destination record for one entry.
    ///
    /// Derives the entry's identity, claims a free id (deleting superseded
    /// predecessors), matches the first category color onto the
    /// destination palette, and creates the record. Destination errors
    /// other than the expected not-found/already-deleted codes propagate
    /// untouched; retry policy belongs to the transport layer.
    pub async fn upsert(&self, entry: &CalendarEntry) -> CalBridgeResult<DestinationEvent> {
        entry.validate()?;

        let base_id = derive_base_id(&entry.source_key);
        let claimed_id = self.resolve_and_claim(&base_id, true).await?;

        let color_id = match entry.category_colors.first() {
            Some(hex) => Some(closest_color_id(hex, self.palette().await?)?),
            None => None,
        };

        let event = DestinationEvent {
            id: claimed_id,
            summary: entry.subject.clone(),
            start: entry.start.with_timezone(&chrono::Utc),
            end: entry.end.with_timezone(&chrono::Utc),
            color_id,
            transparency: entry.busy_status.transparency(),
            reminder_minutes: Some(self.config.reminder_minutes),
        };

        Ok(self.destination.create(event).await?)
    }

    /// Mirror a source window onto the destination.
    ///
    /// The source entry set is authoritative for its own span: any
    /// destination record inside the span not traceable to a current
    /// entry's id family is stale and gets deleted, then every source
    /// entry is upserted in the given order. No rollback on partial
    /// failure; a retried run converges because identities are
    /// deterministic.
    pub async fn reconcile(&self, entries: &[CalendarEntry]) -> CalBridgeResult<SyncReport> {
        let window = TimeWindow::spanning(entries).ok_or(CalBridgeError::EmptyWindow)?;
        let family = IdFamily::from_entries(entries)?;

        let existing = self.destination.list(&window).await?;
        let mut seen = HashSet::with_capacity(existing.len());
        for event in &existing {
            if !seen.insert(event.id.as_str()) {
                return Err(CalBridgeError::IdentityCollision(format!(
                    "destination returned id '{}' twice",
                    event.id
                )));
            }
        }

        let stale: Vec<&DestinationEvent> =
            existing.iter().filter(|e| !family.covers(&e.id)).collect();

        info!(
            window_start = %window.start,
            window_end = %window.end,
            source = entries.len(),
            existing = existing.len(),
            stale = stale.len(),
            "reconciling window"
        );

        for event in &stale {
            match self.destination.delete(event).await {
                Err(DestinationError::Gone) => {
                    debug!(event_id = %event.id, "stale record already deleted");
                }
                other => other?,
            }
        }

        for entry in entries {
            self.upsert(entry).await?;
        }

        Ok(SyncReport {
            window,
            deleted: stale.len(),
            upserted: entries.len(),
        })
    }
}
