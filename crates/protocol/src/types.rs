use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a game installation was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameSource {
    #[serde(rename = "steam")]
    Steam,
    #[serde(rename = "local")]
    Local,
}

impl fmt::Display for GameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameSource::Steam => write!(f, "steam"),
            GameSource::Local => write!(f, "local"),
        }
    }
}

/// An installed game matched against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGame {
    /// Steam app id when known, otherwise the matched folder alias.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_id: Option<u32>,
    pub install_path: String,
    pub save_paths: Vec<String>,
    pub source: GameSource,
    /// Cached icon as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Category of a cached artwork asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    /// Square icon, extracted from the game executable.
    Icon,
    /// Wide library banner.
    Hero,
    /// Transparent logo.
    Logo,
}

impl AssetCategory {
    /// Returns all asset categories.
    pub fn all() -> &'static [AssetCategory] {
        &[AssetCategory::Icon, AssetCategory::Hero, AssetCategory::Logo]
    }

    /// Directory name under the cache root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetCategory::Icon => "icon",
            AssetCategory::Hero => "hero",
            AssetCategory::Logo => "logo",
        }
    }

    /// File extension used for this category (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            AssetCategory::Hero => "jpg",
            AssetCategory::Icon | AssetCategory::Logo => "png",
        }
    }

    /// MIME type matching [`extension`](Self::extension).
    pub fn mime_type(&self) -> &'static str {
        match self {
            AssetCategory::Hero => "image/jpeg",
            AssetCategory::Icon | AssetCategory::Logo => "image/png",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "icon" => Ok(AssetCategory::Icon),
            "hero" => Ok(AssetCategory::Hero),
            "logo" => Ok(AssetCategory::Logo),
            other => Err(format!("unknown asset category: {other}")),
        }
    }
}

/// A backup archive found on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub name: String,
    /// Name of the per-game folder holding the archive.
    pub game: String,
    pub path: String,
    pub size_bytes: u64,
    pub size: String,
    /// Modification time, seconds since the Unix epoch.
    pub modified: i64,
}

/// Save-data summary for a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    pub size_bytes: u64,
    pub size: String,
    pub backups: Vec<BackupInfo>,
}

/// Hero and logo sources for a game.
///
/// Each field is either a cached `data:` URL or the remote URL that is
/// being fetched in the background.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Short game entry shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_id: Option<u32>,
    pub name: String,
}

/// Overview of the library and its backups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub user_name: String,
    pub total_games: usize,
    pub total_size: String,
    pub recent_activity: Vec<BackupInfo>,
    pub games: Vec<GameSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_source_wire_names() {
        assert_eq!(serde_json::to_string(&GameSource::Steam).unwrap(), "\"steam\"");
        assert_eq!(serde_json::to_string(&GameSource::Local).unwrap(), "\"local\"");
        assert_eq!(GameSource::Local.to_string(), "local");
    }

    #[test]
    fn resolved_game_json_field_names() {
        let game = ResolvedGame {
            id: "42".into(),
            name: "Example".into(),
            steam_id: Some(42),
            install_path: "/games/Example".into(),
            save_paths: vec!["/saves".into()],
            source: GameSource::Steam,
            icon: None,
        };
        let json = serde_json::to_string(&game).unwrap();
        assert!(json.contains("\"steamId\":42"));
        assert!(json.contains("\"installPath\""));
        assert!(json.contains("\"savePaths\""));
        assert!(!json.contains("\"icon\""));
    }

    #[test]
    fn resolved_game_without_steam_id() {
        let json = r#"{"id":"Example","name":"Example","installPath":"/g","savePaths":[],"source":"local"}"#;
        let game: ResolvedGame = serde_json::from_str(json).unwrap();
        assert_eq!(game.steam_id, None);
        assert_eq!(game.source, GameSource::Local);
    }

    #[test]
    fn asset_category_layout() {
        assert_eq!(AssetCategory::Icon.extension(), "png");
        assert_eq!(AssetCategory::Hero.extension(), "jpg");
        assert_eq!(AssetCategory::Logo.extension(), "png");
        assert_eq!(AssetCategory::Hero.mime_type(), "image/jpeg");
        assert_eq!(AssetCategory::Logo.dir_name(), "logo");
    }

    #[test]
    fn asset_category_parse() {
        for &cat in AssetCategory::all() {
            assert_eq!(cat.to_string().parse::<AssetCategory>().unwrap(), cat);
        }
        assert!("banner".parse::<AssetCategory>().is_err());
    }
}
