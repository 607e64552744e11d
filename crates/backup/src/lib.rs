//! Save-data backups.
//!
//! Packs a game's save locations into `<root>/<name>/<name>_<timestamp>.zip`
//! and provides the helpers that list, size and delete those archives.

pub mod archive;
pub mod history;
pub mod manifest;
pub mod naming;

// Re-export primary types.
pub use archive::{ArchiveOutcome, create_archive};
pub use history::{
    backup_dir, delete_backup, folder_size, format_size, list_all_backups, list_backups,
};
pub use manifest::{ManifestEntry, build_manifest};
pub use naming::{FALLBACK_NAME, archive_file_name, sanitize_name};

/// Errors for backup operations.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
