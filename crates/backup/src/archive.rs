use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::BackupError;
use crate::manifest::{ManifestEntry, build_manifest};
use crate::naming::{archive_file_name, sanitize_name};

/// Result of [`create_archive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Archive written to this path.
    Created(PathBuf),
    /// None of the sources held any file; nothing was written.
    NoFilesFound,
}

/// Packs `sources` into `<destination_root>/<name>/<name>_<timestamp>.zip`.
///
/// `on_progress` is called once per archived file with the completed
/// percentage; the last call is exactly `100.0`. The destination is only
/// touched when there is something to archive. If writing fails the partial
/// archive is removed before the error is returned.
pub fn create_archive<S, F>(
    game_name: &str,
    sources: &[S],
    destination_root: &Path,
    mut on_progress: F,
) -> Result<ArchiveOutcome, BackupError>
where
    S: AsRef<Path>,
    F: FnMut(f64),
{
    let manifest = build_manifest(sources);
    if manifest.is_empty() {
        tracing::info!(game = game_name, "no files to back up");
        return Ok(ArchiveOutcome::NoFilesFound);
    }

    let dest_dir = destination_root.join(sanitize_name(game_name));
    fs::create_dir_all(&dest_dir)?;
    let zip_path = dest_dir.join(archive_file_name(
        game_name,
        chrono::Local::now().naive_local(),
    ));

    tracing::info!(
        game = game_name,
        files = manifest.len(),
        path = %zip_path.display(),
        "creating backup"
    );

    match write_archive(&zip_path, &manifest, &mut on_progress) {
        Ok(()) => Ok(ArchiveOutcome::Created(zip_path)),
        Err(e) => {
            tracing::error!(path = %zip_path.display(), error = %e, "backup failed");
            if let Err(rm) = fs::remove_file(&zip_path) {
                tracing::warn!(path = %zip_path.display(), error = %rm, "failed to remove partial archive");
            }
            Err(e)
        }
    }
}

fn write_archive(
    zip_path: &Path,
    manifest: &[ManifestEntry],
    on_progress: &mut dyn FnMut(f64),
) -> Result<(), BackupError> {
    let mut writer = zip::ZipWriter::new(BufWriter::new(File::create(zip_path)?));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    let total = manifest.len() as f64;
    for (i, entry) in manifest.iter().enumerate() {
        let mut source = File::open(&entry.source)?;
        writer.start_file(entry.name.as_str(), options)?;
        io::copy(&mut source, &mut writer)?;
        on_progress((i + 1) as f64 / total * 100.0);
    }

    writer.finish()?.flush()?;
    Ok(())
}
