//! Steam integration for GameVault.
//!
//! Locates the Steam client, reads its text VDF configuration and exposes
//! the library roots and the active account the scanner and resolver need.

pub mod libraries;
pub mod paths;
#[cfg(target_os = "linux")]
mod paths_linux;
#[cfg(target_os = "windows")]
mod paths_windows;
pub mod users;
pub mod vdf;

// Re-export primary types.
pub use libraries::library_paths;
pub use paths::{Paths, app_manifest_path, common_dir, hero_url, logo_url, steamapps_dir};
pub use users::{ActiveAccount, active_account, steam_id64_to_account_id};

/// Errors for Steam operations.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("VDF parse error: {0}")]
    Vdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
