use std::path::PathBuf;

use crate::SteamError;

/// Install locations relative to `$HOME`, checked in order.
const CANDIDATES: &[&[&str]] = &[
    &[".steam", "steam"],
    &[".local", "share", "Steam"],
    // Flatpak
    &[".var", "app", "com.valvesoftware.Steam", ".steam", "steam"],
];

/// Returns the Steam base directory on Linux/Unix systems.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    let home = dirs::home_dir().ok_or(SteamError::NotFound)?;

    CANDIDATES
        .iter()
        .map(|parts| parts.iter().fold(home.clone(), |acc, p| acc.join(p)))
        .find(|dir| dir.exists())
        .ok_or(SteamError::NotFound)
}
