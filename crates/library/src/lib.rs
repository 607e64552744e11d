//! GameVault orchestration layer.
//!
//! Ties the scanner, the backup service and the asset cache together for a
//! UI shell. Long-running work happens on background tasks that report
//! through a [`LibraryEvent`] channel.

pub mod events;
pub mod library;

// Re-export primary types.
pub use events::{BackupResult, LibraryEvent};
pub use library::{Library, LibraryParts};

/// Errors for library operations.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("unknown game: {0}")]
    UnknownGame(String),

    #[error("no save paths for {0}")]
    NoSavePaths(String),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
