use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use image::ImageFormat;
use image::imageops::FilterType;

use crate::ScanError;
use crate::pe;
use crate::ranking::{RankingRules, rank_candidates};

/// Icons are shrunk to fit a square of this size.
pub const ICON_SIZE: u32 = 64;

/// Extracts a PNG icon from the best-ranked executable under `install_path`.
///
/// Candidates are tried best first until one yields an icon. Returns `None`
/// when no executable carries a usable icon.
pub fn extract_icon_candidate(install_path: &Path) -> Option<Vec<u8>> {
    extract_icon_with(install_path, &RankingRules::default())
}

/// [`extract_icon_candidate`] with explicit ranking rules.
pub fn extract_icon_with(install_path: &Path, rules: &RankingRules) -> Option<Vec<u8>> {
    for candidate in rank_candidates(install_path, rules) {
        match icon_from_executable(&candidate.path) {
            Ok(png) => {
                tracing::debug!(
                    exe = %candidate.path.display(),
                    score = candidate.score,
                    "extracted icon"
                );
                return Some(png);
            }
            Err(e) => {
                tracing::trace!(exe = %candidate.path.display(), error = %e, "no icon");
            }
        }
    }
    None
}

/// Reads the primary icon of one executable as a thumbnail PNG.
pub fn icon_from_executable(path: &Path) -> Result<Vec<u8>, ScanError> {
    let mut reader = BufReader::new(File::open(path)?);
    let ico = pe::primary_icon(&mut reader)?;
    thumbnail_png(&ico)
}

/// Decodes an `.ico`, shrinks it into an [`ICON_SIZE`] box and encodes PNG.
fn thumbnail_png(ico: &[u8]) -> Result<Vec<u8>, ScanError> {
    let mut img = image::load_from_memory_with_format(ico, ImageFormat::Ico)?;
    if img.width() > ICON_SIZE || img.height() > ICON_SIZE {
        img = img.resize(ICON_SIZE, ICON_SIZE, FilterType::Lanczos3);
    }

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::pe_with_icon;
    use std::fs;

    fn decode(png: &[u8]) -> image::DynamicImage {
        image::load_from_memory_with_format(png, ImageFormat::Png).unwrap()
    }

    #[test]
    fn large_icons_are_shrunk() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("game.exe");
        fs::write(&exe, pe_with_icon(256)).unwrap();

        let png = icon_from_executable(&exe).unwrap();
        let img = decode(&png);
        assert_eq!((img.width(), img.height()), (ICON_SIZE, ICON_SIZE));
    }

    #[test]
    fn small_icons_keep_their_size() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("game.exe");
        fs::write(&exe, pe_with_icon(32)).unwrap();

        let img = decode(&icon_from_executable(&exe).unwrap());
        assert_eq!((img.width(), img.height()), (32, 32));
    }

    #[test]
    fn falls_back_to_next_candidate() {
        let tmp = tempfile::tempdir().unwrap();
        let game = tmp.path().join("ExampleGame");
        fs::create_dir_all(game.join("bin")).unwrap();
        // Best ranked but not a PE image.
        fs::write(game.join("bin").join("ExampleGame.exe"), b"not a pe").unwrap();
        fs::write(game.join("other.exe"), pe_with_icon(48)).unwrap();

        let png = extract_icon_candidate(&game).unwrap();
        assert_eq!(decode(&png).width(), 48);
    }

    #[test]
    fn denylisted_icons_are_never_used() {
        let tmp = tempfile::tempdir().unwrap();
        let game = tmp.path().join("G");
        fs::create_dir_all(&game).unwrap();
        fs::write(game.join("unins000.exe"), pe_with_icon(48)).unwrap();

        assert!(extract_icon_candidate(&game).is_none());
    }

    #[test]
    fn no_executables() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(extract_icon_candidate(tmp.path()).is_none());
    }
}
