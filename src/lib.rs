//! Core engine for mirroring a desktop calendar store into a hosted
//! calendar service.
//!
//! This crate provides the synchronization and identity-reconciliation
//! engine:
//! - `entry` and `codec` for the canonical appointment model and its
//!   round-trippable transport serialization
//! - `identity` for stable destination-id derivation
//! - `occurrence` for expanding recurring series into concrete entries
//! - `sync` for idempotent upsert and full-window reconciliation against
//!   a `destination::Destination`
//!
//! The source store's access layer, the destination's HTTP transport and
//! the QR image channel are external collaborators consumed through the
//! seams in `source` and `destination`.

pub mod codec;
pub mod color;
pub mod config;
pub mod destination;
pub mod entry;
pub mod error;
pub mod folder;
pub mod identity;
pub mod occurrence;
pub mod source;
pub mod sync;
pub mod window;

pub use config::SyncConfig;
pub use destination::{Destination, DestinationError, DestinationEvent};
pub use entry::{BusyStatus, CalendarEntry, Transparency};
pub use error::{CalBridgeError, CalBridgeResult};
pub use occurrence::expand_records;
pub use source::{RawAppointment, RecurringSeries, SourceRecord};
pub use sync::{SyncEngine, SyncReport};
pub use window::TimeWindow;
