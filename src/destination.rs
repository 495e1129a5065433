//! The destination calendar service seam.
//!
//! The engine consumes the destination through this trait; the concrete
//! transport (auth, HTTP retry/backoff, rate limiting) lives behind it.
//! The core special-cases only `NotFound` and `Gone`; every other error is
//! opaque and fatal to the current operation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::Transparency;
use crate::window::TimeWindow;

/// A record as the destination holds it. The engine only ever compares
/// `id`, `start` and `end`; the rest rides along for creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationEvent {
    pub id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub color_id: Option<String>,
    pub transparency: Transparency,
    /// Minutes before start for a popup reminder, if any.
    pub reminder_minutes: Option<i64>,
}

/// Destination call failures, categorized by status code.
#[derive(Error, Debug)]
pub enum DestinationError {
    /// 404-equivalent. Expected terminator of the identity claim loop.
    #[error("event not found")]
    NotFound,

    /// 410-equivalent. Swallowed during cleanup (idempotent delete).
    #[error("event already deleted")]
    Gone,

    /// The destination refused to create a record under a used id.
    #[error("identifier conflict")]
    Conflict,

    #[error("destination responded with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Capability set the engine needs from the destination calendar.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Fetch a record by id. `Err(NotFound)` when no record has ever used
    /// the id.
    async fn get(&self, event_id: &str) -> Result<DestinationEvent, DestinationError>;

    /// Create a record under the id carried in `event`.
    async fn create(&self, event: DestinationEvent) -> Result<DestinationEvent, DestinationError>;

    /// Delete a record. `Err(Gone)` when it was already deleted.
    async fn delete(&self, event: &DestinationEvent) -> Result<(), DestinationError>;

    /// List live records whose times fall inside the window.
    async fn list(&self, window: &TimeWindow) -> Result<Vec<DestinationEvent>, DestinationError>;

    /// The calendar's fixed color palette: color id to `#RRGGBB`.
    async fn list_palette(&self) -> Result<BTreeMap<String, String>, DestinationError>;
}
