//! Error types for parkwatch.

use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ParkError>;

/// Errors surfaced by the query core.
///
/// Malformed seed records are deliberately *not* represented here: ingest
/// absorbs them, counts them in [`crate::store::LoadReport`], and keeps
/// loading. Unreachable seed data surfaces as `Io` or `Serialization` and is
/// fatal to the calling operation, never silently substituted with an empty
/// result. Query-time errors propagate unmodified; there is no retry logic
/// because every operation is local and deterministic.
#[derive(Error, Debug)]
pub enum ParkError {
    /// A scale migration failed. The store is left untouched.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Caller-supplied value outside the accepted domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Geohash encoding rejected a coordinate.
    #[error("geohash encoding failed: {0}")]
    Geohash(String),

    /// Underlying I/O failure while reading seed data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed file could not be decoded at the file level.
    #[error("serialization error: {0}")]
    Serialization(String),
}
