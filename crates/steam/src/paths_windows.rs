use std::path::PathBuf;

use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

use crate::SteamError;

/// Returns the Steam base directory on Windows using the registry.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);

    // 64-bit view first, then 32-bit, then the per-user key.
    let candidates = [
        (&hklm, r"SOFTWARE\WOW6432Node\Valve\Steam", "InstallPath"),
        (&hklm, r"SOFTWARE\Valve\Steam", "InstallPath"),
        (&hkcu, r"Software\Valve\Steam", "SteamPath"),
    ];

    for (hive, subkey, value) in candidates {
        if let Some(path) = read_registry_path(hive, subkey, value) {
            tracing::debug!(subkey, path = %path.display(), "steam install located");
            return Ok(path);
        }
    }

    Err(SteamError::NotFound)
}

fn read_registry_path(hive: &RegKey, subkey: &str, value: &str) -> Option<PathBuf> {
    let key = hive.open_subkey(subkey).ok()?;
    let raw: String = key.get_value(value).ok()?;
    if raw.is_empty() {
        return None;
    }
    // SteamPath under HKCU is stored with forward slashes.
    Some(PathBuf::from(raw.replace('/', "\\")))
}
