use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One file to add to an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub source: PathBuf,
    /// Name inside the archive, `/`-separated.
    pub name: String,
}

/// Lists the files to archive for `sources`.
///
/// A file is stored under its base name. A directory contributes every file
/// below it, named relative to the directory's parent so the directory name
/// is kept. Missing sources are skipped, as is a file reached twice.
///
/// Every distinct file gets an entry. When two files map to the same archive
/// name, later ones are renamed `name (2).ext`, `name (3).ext` and so on.
pub fn build_manifest<S: AsRef<Path>>(sources: &[S]) -> Vec<ManifestEntry> {
    let mut entries = Vec::new();
    let mut names = HashSet::new();
    let mut seen = HashSet::new();
    let mut add = |source: PathBuf, name: String| {
        if !seen.insert(source.clone()) {
            return;
        }
        let name = if names.contains(&name) {
            let renamed = unique_name(&name, &names);
            tracing::debug!(source = %source.display(), name, renamed, "archive name taken");
            renamed
        } else {
            name
        };
        names.insert(name.clone());
        entries.push(ManifestEntry { source, name });
    };

    for source in sources {
        let source = source.as_ref();
        if source.is_file() {
            if let Some(name) = source.file_name() {
                add(source.to_path_buf(), name.to_string_lossy().into_owned());
            }
        } else if source.is_dir() {
            let base = source.parent().unwrap_or(source);
            for entry in WalkDir::new(source).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unreadable entry");
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(base) else {
                    continue;
                };
                add(entry.path().to_path_buf(), archive_name(relative));
            }
        } else {
            tracing::debug!(source = %source.display(), "save path does not exist");
        }
    }

    entries
}

/// First `stem (n).ext` variant of `name` not in `taken`, counting from 2.
fn unique_name(name: &str, taken: &HashSet<String>) -> String {
    let (dir, file) = match name.rfind('/') {
        Some(i) => name.split_at(i + 1),
        None => ("", name),
    };
    let (stem, ext) = match file.rfind('.') {
        Some(i) if i > 0 => file.split_at(i),
        _ => (file, ""),
    };

    (2..)
        .map(|n| format!("{dir}{stem} ({n}){ext}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
