//! GameVault configuration.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/gamevault/config.toml`
//! - Windows: `%APPDATA%/gamevault/config.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where backup archives are written, one folder per game.
    #[serde(default = "default_backup_root")]
    pub backup_root: PathBuf,

    /// Folders whose subdirectories are scanned as game installs.
    #[serde(default)]
    pub local_roots: Vec<PathBuf>,

    /// SQLite game catalog.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Artwork cache directory.
    #[serde(default = "default_cache_root")]
    pub cache_root: PathBuf,

    /// HTTP timeout for artwork downloads, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_backup_root() -> PathBuf {
    working_dir().join("backups")
}

fn default_catalog_path() -> PathBuf {
    working_dir().join("database.db")
}

fn default_cache_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(working_dir)
        .join("GameVault")
        .join("cache")
}

fn default_fetch_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_root: default_backup_root(),
            local_roots: Vec::new(),
            catalog_path: default_catalog_path(),
            cache_root: default_cache_root(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Config {
    /// Loads configuration from `path` (or the platform default), creating
    /// it with defaults if it does not exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(&path)?;
            tracing::info!(path = %path.display(), "created default configuration");
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("gamevault").join("config.toml"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("no configuration directory on this system"))?;
        Ok(config_dir.join("gamevault").join("config.toml"))
    }
}
