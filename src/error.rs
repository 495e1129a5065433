//! Error types for the calbridge engine.

use thiserror::Error;

use crate::destination::DestinationError;

/// Errors that can occur while mirroring a source calendar window.
#[derive(Error, Debug)]
pub enum CalBridgeError {
    /// A transport payload (QR/URL string) could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A color string is not a legal `#RRGGBB` encoding.
    #[error("Invalid color encoding: {0}")]
    InvalidColor(String),

    /// The destination exposes no palette to match against.
    #[error("Destination palette is empty")]
    NoPalette,

    /// Reconciling an empty source set: the window is undefined.
    #[error("Cannot reconcile an empty source window")]
    EmptyWindow,

    /// Two records in one run derived the same identity. Always a bug in
    /// the caller or the expander, never a recoverable runtime condition.
    #[error("Duplicate derived identity: {0}")]
    IdentityCollision(String),

    /// A raw source field could not be interpreted.
    #[error("Source record error: {0}")]
    Source(String),

    /// Destination call failed with something other than the expected
    /// not-found/already-deleted codes.
    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calbridge operations.
pub type CalBridgeResult<T> = Result<T, CalBridgeError>;
