use std::path::PathBuf;
use std::sync::Arc;

use gamevault_asset_cache::AssetCache;
use gamevault_backup::{ArchiveOutcome, create_archive, folder_size, format_size};
use gamevault_protocol::{
    AssetCategory, DashboardSummary, GameAssets, GameDetails, GameSummary, ResolvedGame,
};
use gamevault_scanner::{GameScanner, extract_icon_candidate};
use tokio::sync::mpsc;

use crate::LibraryError;
use crate::events::{BackupResult, LibraryEvent};

/// Number of backups shown as recent activity on the dashboard.
const RECENT_BACKUPS: usize = 5;

const EVENT_CHANNEL_SIZE: usize = 256;

/// Everything a [`Library`] is built from.
pub struct LibraryParts {
    pub scanner: GameScanner,
    pub cache: AssetCache,
    pub backup_root: PathBuf,
    /// Shown on the dashboard greeting.
    pub user_name: String,
}

struct Inner {
    scanner: GameScanner,
    cache: AssetCache,
    backup_root: PathBuf,
    user_name: String,
}

/// Entry point for a UI shell.
///
/// Cheap to clone; clones share the same scanner, cache and event channel.
#[derive(Clone)]
pub struct Library {
    inner: Arc<Inner>,
    events: mpsc::Sender<LibraryEvent>,
}

impl Library {
    /// Creates the library and the receiving end of its event channel.
    pub fn new(parts: LibraryParts) -> (Self, mpsc::Receiver<LibraryEvent>) {
        let (events, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let inner = Arc::new(Inner {
            scanner: parts.scanner,
            cache: parts.cache,
            backup_root: parts.backup_root,
            user_name: parts.user_name,
        });
        (Self { inner, events }, rx)
    }

    pub fn backup_root(&self) -> &std::path::Path {
        &self.inner.backup_root
    }

    /// Scans for games and attaches cached icons.
    ///
    /// Games without a cached icon are handed to a background task that
    /// extracts one from the executable and announces it with
    /// [`LibraryEvent::IconReady`].
    pub async fn games(&self) -> Result<Vec<ResolvedGame>, LibraryError> {
        let games = self.installed_games().await?;

        let missing: Vec<ResolvedGame> = games
            .iter()
            .filter(|g| g.icon.is_none())
            .cloned()
            .collect();

        if !missing.is_empty() {
            tracing::debug!(count = missing.len(), "backfilling icons");
            let inner = self.inner.clone();
            let events = self.events.clone();
            tokio::task::spawn_blocking(move || backfill_icons(&inner, &events, missing));
        }

        Ok(games)
    }

    /// Scans for games and attaches cached icons, without extracting new ones.
    pub async fn installed_games(&self) -> Result<Vec<ResolvedGame>, LibraryError> {
        let mut games = self.scan().await?;
        for game in &mut games {
            game.icon = self.inner.cache.get_as_base64(AssetCategory::Icon, &game.id);
        }
        Ok(games)
    }

    /// Looks up one installed game by id.
    pub async fn find_game(&self, id: &str) -> Result<Option<ResolvedGame>, LibraryError> {
        let inner = self.inner.clone();
        let id = id.to_string();
        Ok(tokio::task::spawn_blocking(move || inner.scanner.find_game(&id)).await?)
    }

    /// Returns hero and logo images for a game.
    ///
    /// Cached images come back as `data:` URLs. Otherwise, when the game has
    /// a Steam id, the CDN URL is returned and a background download is
    /// started; [`LibraryEvent::AssetCached`] reports its completion.
    pub async fn game_assets(&self, id: &str, steam_id: Option<u32>) -> GameAssets {
        GameAssets {
            hero: self.asset(AssetCategory::Hero, id, steam_id),
            logo: self.asset(AssetCategory::Logo, id, steam_id),
        }
    }

    /// Starts a backup of a game's save paths in the background.
    ///
    /// Progress and the final result arrive as [`LibraryEvent`]s.
    pub async fn start_backup(&self, id: &str) -> Result<(), LibraryError> {
        let game = self
            .find_game(id)
            .await?
            .ok_or_else(|| LibraryError::UnknownGame(id.to_string()))?;
        if game.save_paths.is_empty() {
            return Err(LibraryError::NoSavePaths(game.name));
        }

        let inner = self.inner.clone();
        let events = self.events.clone();
        tokio::task::spawn_blocking(move || {
            let id = game.id.clone();
            let outcome = create_archive(&game.name, &game.save_paths, &inner.backup_root, |percent| {
                let _ = events.blocking_send(LibraryEvent::BackupProgress {
                    id: id.clone(),
                    percent,
                });
            });

            let result = match outcome {
                Ok(ArchiveOutcome::Created(path)) => BackupResult::Created(path),
                Ok(ArchiveOutcome::NoFilesFound) => BackupResult::NoFilesFound,
                Err(e) => BackupResult::Failed(e.to_string()),
            };
            let _ = events.blocking_send(LibraryEvent::BackupFinished { id, result });
        });

        Ok(())
    }

    /// Save size and backup history for a game, `None` if it is not installed.
    pub async fn game_details(&self, id: &str) -> Result<Option<GameDetails>, LibraryError> {
        let Some(game) = self.find_game(id).await? else {
            return Ok(None);
        };

        let inner = self.inner.clone();
        let details = tokio::task::spawn_blocking(move || {
            let size_bytes = folder_size(&game.save_paths);
            GameDetails {
                size_bytes,
                size: format_size(size_bytes),
                backups: gamevault_backup::list_backups(&inner.backup_root, &game.name),
            }
        })
        .await?;
        Ok(Some(details))
    }

    /// Library overview: game count, backup volume and recent backups.
    pub async fn dashboard(&self) -> Result<DashboardSummary, LibraryError> {
        let games = self.scan().await?;

        let inner = self.inner.clone();
        let backups =
            tokio::task::spawn_blocking(move || gamevault_backup::list_all_backups(&inner.backup_root))
                .await?;
        let total_bytes: u64 = backups.iter().map(|b| b.size_bytes).sum();

        Ok(DashboardSummary {
            user_name: self.inner.user_name.clone(),
            total_games: games.len(),
            total_size: format_size(total_bytes),
            recent_activity: backups.into_iter().take(RECENT_BACKUPS).collect(),
            games: games
                .into_iter()
                .map(|g| GameSummary {
                    id: g.id,
                    steam_id: g.steam_id,
                    name: g.name,
                })
                .collect(),
        })
    }

    async fn scan(&self) -> Result<Vec<ResolvedGame>, LibraryError> {
        let inner = self.inner.clone();
        Ok(tokio::task::spawn_blocking(move || inner.scanner.scan_all()).await?)
    }

    fn asset(&self, category: AssetCategory, id: &str, steam_id: Option<u32>) -> Option<String> {
        if let Some(data_url) = self.inner.cache.get_as_base64(category, id) {
            return Some(data_url);
        }

        let app_id = steam_id?;
        let url = match category {
            AssetCategory::Hero => gamevault_steam::hero_url(app_id),
            AssetCategory::Logo => gamevault_steam::logo_url(app_id),
            AssetCategory::Icon => return None,
        };

        let inner = self.inner.clone();
        let events = self.events.clone();
        let id = id.to_string();
        let download_url = url.clone();
        tokio::spawn(async move {
            if inner.cache.fetch_from_url(category, &id, &download_url).await {
                let _ = events.send(LibraryEvent::AssetCached { id, category }).await;
            }
        });

        Some(url)
    }
}

/// Extracts and caches icons for `games`, one at a time.
fn backfill_icons(inner: &Inner, events: &mpsc::Sender<LibraryEvent>, games: Vec<ResolvedGame>) {
    for game in games {
        if inner.cache.has_cached(AssetCategory::Icon, &game.id) {
            continue;
        }
        let Some(png) = extract_icon_candidate(std::path::Path::new(&game.install_path)) else {
            continue;
        };
        if let Err(e) = inner.cache.save_bytes(AssetCategory::Icon, &game.id, &png) {
            tracing::warn!(id = %game.id, error = %e, "failed to cache icon");
            continue;
        }
        let Some(data_url) = inner.cache.get_as_base64(AssetCategory::Icon, &game.id) else {
            continue;
        };
        let event = LibraryEvent::IconReady {
            id: game.id,
            data_url,
        };
        if events.blocking_send(event).is_err() {
            // Receiver gone; nobody is listening any more.
            break;
        }
    }
}
