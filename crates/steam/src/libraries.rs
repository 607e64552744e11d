use std::path::{Path, PathBuf};

use crate::SteamError;
use crate::paths::Paths;
use crate::vdf;

/// Returns every Steam library root listed in `libraryfolders.vdf`.
///
/// Returns an empty list when the file does not exist.
pub fn library_paths(paths: &Paths) -> Result<Vec<PathBuf>, SteamError> {
    library_paths_from(&paths.library_folders_path())
}

/// Parses library roots from a specific `libraryfolders.vdf`.
pub fn library_paths_from(path: &Path) -> Result<Vec<PathBuf>, SteamError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "libraryfolders.vdf not found");
        return Ok(Vec::new());
    }

    let root = vdf::load(path)?;
    let Some(folders) = root.get_object("libraryfolders") else {
        return Ok(Vec::new());
    };

    let mut libraries = Vec::new();
    for (_, value) in folders.iter() {
        // Old-format files also carry "TimeNextStatsReport" style string entries.
        let vdf::Value::Object(entry) = value else {
            continue;
        };
        if let Some(p) = entry.get_str("path").filter(|p| !p.is_empty()) {
            let p = PathBuf::from(p);
            if !libraries.contains(&p) {
                libraries.push(p);
            }
        }
    }

    Ok(libraries)
}
