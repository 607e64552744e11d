//! Installation-validity checks.
//!
//! A catalog match only counts as an installed game if the install looks
//! live: Steam must still have an app manifest for it, and a local folder
//! must contain an executable near the top.

use std::path::Path;

use walkdir::WalkDir;

/// True if `path` has an `.exe` extension (any case).
pub fn is_executable(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}

/// A Steam install is valid when `appmanifest_<id>.acf` exists in the
/// library's `steamapps` directory.
pub fn steam_install_is_valid(library: &Path, steam_id: Option<u32>) -> bool {
    let Some(app_id) = steam_id else {
        return false;
    };
    gamevault_steam::app_manifest_path(library, app_id).is_file()
}

/// A local install is valid when an executable sits directly inside the
/// folder or one level below.
pub fn local_install_is_valid(folder: &Path) -> bool {
    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| e.file_type().is_file() && is_executable(e.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn exe_extension_is_case_insensitive() {
        assert!(is_executable(Path::new("Game.EXE")));
        assert!(is_executable(Path::new("dir/game.exe")));
        assert!(!is_executable(Path::new("game.exe.bak")));
        assert!(!is_executable(Path::new("exe")));
    }

    #[test]
    fn steam_requires_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let steamapps = tmp.path().join("steamapps");
        fs::create_dir_all(&steamapps).unwrap();

        assert!(!steam_install_is_valid(tmp.path(), Some(42)));
        fs::write(steamapps.join("appmanifest_42.acf"), "\"AppState\" {}").unwrap();
        assert!(steam_install_is_valid(tmp.path(), Some(42)));
        assert!(!steam_install_is_valid(tmp.path(), Some(43)));
        assert!(!steam_install_is_valid(tmp.path(), None));
    }

    #[test]
    fn local_exe_at_top_level() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("game.exe"), b"").unwrap();
        assert!(local_install_is_valid(tmp.path()));
    }

    #[test]
    fn local_exe_one_level_down() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("bin")).unwrap();
        fs::write(tmp.path().join("bin").join("Game.Exe"), b"").unwrap();
        assert!(local_install_is_valid(tmp.path()));
    }

    #[test]
    fn local_exe_too_deep_or_missing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a").join("b")).unwrap();
        fs::write(tmp.path().join("a").join("b").join("game.exe"), b"").unwrap();
        fs::write(tmp.path().join("readme.txt"), b"").unwrap();
        assert!(!local_install_is_valid(tmp.path()));
    }

    #[test]
    fn directory_named_like_exe_does_not_count() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("fake.exe")).unwrap();
        assert!(!local_install_is_valid(tmp.path()));
    }
}
