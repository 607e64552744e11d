//! Backup history: listing, sizing and deleting existing archives.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use gamevault_protocol::BackupInfo;
use walkdir::WalkDir;

use crate::naming::sanitize_name;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Directory holding a game's archives.
pub fn backup_dir(backup_root: &Path, game_name: &str) -> PathBuf {
    backup_root.join(sanitize_name(game_name))
}

/// Archives of one game, newest first.
pub fn list_backups(backup_root: &Path, game_name: &str) -> Vec<BackupInfo> {
    let dir = backup_dir(backup_root, game_name);
    let Ok(entries) = fs::read_dir(&dir) else {
        return Vec::new();
    };

    let mut backups: Vec<BackupInfo> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| is_zip(p))
        .filter_map(|p| backup_info(&p))
        .collect();
    sort_newest_first(&mut backups);
    backups
}

/// Every archive under `backup_root`, newest first.
pub fn list_all_backups(backup_root: &Path) -> Vec<BackupInfo> {
    let mut backups: Vec<BackupInfo> = WalkDir::new(backup_root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_zip(e.path()))
        .filter_map(|e| backup_info(e.path()))
        .collect();
    sort_newest_first(&mut backups);
    backups
}

/// Deletes a backup archive. Only existing `.zip` files are removed.
pub fn delete_backup(path: &Path) -> bool {
    if !path.is_file() || !is_zip(path) {
        return false;
    }
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "deleted backup");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to delete backup");
            false
        }
    }
}

/// Total size in bytes of the given files and directory trees.
/// Missing or unreadable entries are skipped.
pub fn folder_size<S: AsRef<Path>>(paths: &[S]) -> u64 {
    paths
        .iter()
        .flat_map(|p| WalkDir::new(p.as_ref()).into_iter().filter_map(|e| e.ok()))
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Formats a byte count as `"1.50 KB"`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} {}", UNITS[UNITS.len() - 1])
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

fn backup_info(path: &Path) -> Option<BackupInfo> {
    let meta = fs::metadata(path).ok()?;
    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    let game = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Some(BackupInfo {
        name: path.file_name()?.to_string_lossy().into_owned(),
        game,
        path: path.to_string_lossy().into_owned(),
        size_bytes: meta.len(),
        size: format_size(meta.len()),
        modified: chrono::DateTime::<chrono::Utc>::from(modified).timestamp(),
    })
}

fn sort_newest_first(backups: &mut [BackupInfo]) {
    backups.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
}
