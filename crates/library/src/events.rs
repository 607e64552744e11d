use std::path::PathBuf;

use gamevault_protocol::AssetCategory;

/// Outcome of a background backup.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupResult {
    Created(PathBuf),
    NoFilesFound,
    Failed(String),
}

/// Notifications from background work.
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    /// An icon was extracted and cached; `data_url` is ready to display.
    IconReady { id: String, data_url: String },
    /// A hero or logo finished downloading.
    AssetCached { id: String, category: AssetCategory },
    /// Backup progress in percent, strictly increasing per backup.
    BackupProgress { id: String, percent: f64 },
    /// A backup finished, successfully or not.
    BackupFinished { id: String, result: BackupResult },
}
