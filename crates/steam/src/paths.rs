use std::path::{Path, PathBuf};

use crate::SteamError;

const CDN_BASE: &str = "https://cdn.cloudflare.steamstatic.com/steam/apps";

/// Provides access to Steam directory paths.
#[derive(Debug, Clone)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Creates a new `Paths` instance with auto-detected Steam directory.
    pub fn new() -> Result<Self, SteamError> {
        let base_dir = get_base_dir()?;
        Ok(Self { base_dir })
    }

    /// Creates a new `Paths` instance with a custom base directory.
    pub fn with_base(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the Steam base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Returns the `steamapps` directory of the main installation.
    pub fn steamapps_dir(&self) -> PathBuf {
        steamapps_dir(&self.base_dir)
    }

    /// Returns the path to `libraryfolders.vdf`.
    pub fn library_folders_path(&self) -> PathBuf {
        self.steamapps_dir().join("libraryfolders.vdf")
    }

    /// Returns the path to `config/loginusers.vdf`.
    pub fn login_users_path(&self) -> PathBuf {
        self.base_dir.join("config").join("loginusers.vdf")
    }
}

/// Returns `<library>/steamapps`.
pub fn steamapps_dir(library: &Path) -> PathBuf {
    library.join("steamapps")
}

/// Returns `<library>/steamapps/common`, where game folders live.
pub fn common_dir(library: &Path) -> PathBuf {
    steamapps_dir(library).join("common")
}

/// Returns the app manifest Steam writes for every installed app.
pub fn app_manifest_path(library: &Path, app_id: u32) -> PathBuf {
    steamapps_dir(library).join(format!("appmanifest_{app_id}.acf"))
}

/// Returns the CDN URL of the library hero image.
pub fn hero_url(app_id: u32) -> String {
    format!("{CDN_BASE}/{app_id}/library_hero.jpg")
}

/// Returns the CDN URL of the transparent logo.
pub fn logo_url(app_id: u32) -> String {
    format!("{CDN_BASE}/{app_id}/logo.png")
}

// Platform-specific base directory detection.
#[cfg(target_os = "linux")]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_linux::get_base_dir()
}

#[cfg(target_os = "windows")]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_windows::get_base_dir()
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    Err(SteamError::NotFound)
}
