/// FlatTable error types
use thiserror::Error;

/// Errors surfaced across the crate boundary.
///
/// Degraded-mode conditions (missing preference blob, stale request
/// completions, unknown fields in column operations) are deliberately NOT
/// errors; they are logged no-ops so data display is never blocked.
#[derive(Debug, Error)]
pub enum Error {
    /// A preference blob could not be encoded or decoded.
    #[error("preference blob codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The external preference store failed to load or save a blob.
    #[error("preference store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
