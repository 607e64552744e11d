//! Wires the scanner, caches and backup engine together and runs one command.

use std::sync::Arc;
use std::time::Duration;

use gamevault_asset_cache::{AssetCache, ReqwestFetcher};
use gamevault_catalog::SqliteCatalog;
use gamevault_library::{BackupResult, Library, LibraryEvent, LibraryParts};
use gamevault_resolver::{HostContext, PlatformAccount, TemplateResolver};
use gamevault_scanner::{GameScanner, ScanRoots};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::cli::Commands;
use crate::config::Config;

/// Runs `command` to completion, printing its result as JSON on stdout.
pub async fn run(config: Config, command: Commands) -> anyhow::Result<()> {
    let (library, events) = build_library(&config)?;

    match command {
        Commands::Scan => {
            print_json(&library.installed_games().await?)?;
        }
        Commands::Icons => {
            let games = library.games().await?;
            let cached = games.iter().filter(|g| g.icon.is_some()).count();
            tracing::info!(total = games.len(), cached, "extracting missing icons");
            drop(library);
            let extracted = drain_events(events).await;
            tracing::info!(extracted, "icons ready");
        }
        Commands::Assets { id } => {
            let steam_id = library.find_game(&id).await?.and_then(|g| g.steam_id);
            let assets = library.game_assets(&id, steam_id).await;
            print_json(&assets)?;
            drop(library);
            drain_events(events).await;
        }
        Commands::Backup { id } => {
            library.start_backup(&id).await?;
            drop(library);
            drain_events(events).await;
        }
        Commands::Backups { id } => {
            let details = library
                .game_details(&id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("game not found: {id}"))?;
            print_json(&details.backups)?;
        }
        Commands::Details { id } => {
            let details = library
                .game_details(&id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("game not found: {id}"))?;
            print_json(&details)?;
        }
        Commands::Delete { path } => {
            let deleted = gamevault_backup::delete_backup(&path);
            print_json(&serde_json::json!({ "deleted": deleted }))?;
        }
        Commands::Dashboard => {
            print_json(&library.dashboard().await?)?;
        }
    }

    Ok(())
}

fn build_library(config: &Config) -> anyhow::Result<(Library, mpsc::Receiver<LibraryEvent>)> {
    let context = Arc::new(HostContext::detect(&platform_account()));
    let user_name = context.username.clone();

    let catalog = Arc::new(SqliteCatalog::new(&config.catalog_path));
    let roots = ScanRoots::detect(config.local_roots.clone());
    tracing::info!(
        steam_libraries = roots.steam_libraries.len(),
        local_roots = roots.local_roots.len(),
        catalog = %config.catalog_path.display(),
        "scan roots"
    );
    let scanner = GameScanner::new(TemplateResolver::new(context), catalog, roots);

    let fetcher = ReqwestFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
    let cache = AssetCache::new(&config.cache_root, Arc::new(fetcher));

    Ok(Library::new(LibraryParts {
        scanner,
        cache,
        backup_root: config.backup_root.clone(),
        user_name,
    }))
}

/// Steam install and logged-in account, when Steam is present.
fn platform_account() -> PlatformAccount {
    let paths = match gamevault_steam::Paths::new() {
        Ok(paths) => paths,
        Err(e) => {
            tracing::debug!(error = %e, "Steam not found");
            return PlatformAccount::default();
        }
    };

    let account = gamevault_steam::active_account(&paths).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to read Steam login users");
        None
    });

    PlatformAccount {
        install_dir: Some(paths.base_dir().clone()),
        account_id: account.as_ref().map(|a| a.account_id.clone()),
        account_name: account.map(|a| a.account_name),
    }
}

/// Logs events until every sender is gone. Returns how many icons or
/// assets became available.
async fn drain_events(mut events: mpsc::Receiver<LibraryEvent>) -> usize {
    let mut ready = 0;
    while let Some(event) = events.recv().await {
        match &event {
            LibraryEvent::IconReady { .. } | LibraryEvent::AssetCached { .. } => ready += 1,
            LibraryEvent::BackupFinished { result, .. } => {
                if let Err(e) = print_json(&backup_summary(result)) {
                    tracing::error!(error = %e, "failed to print backup result");
                }
            }
            LibraryEvent::BackupProgress { .. } => {}
        }
        tracing::info!("{}", describe(&event));
    }
    ready
}

fn describe(event: &LibraryEvent) -> String {
    match event {
        LibraryEvent::IconReady { id, .. } => format!("icon cached for {id}"),
        LibraryEvent::AssetCached { id, category } => {
            format!("{} cached for {id}", category.dir_name())
        }
        LibraryEvent::BackupProgress { id, percent } => format!("{id}: {percent:.0}%"),
        LibraryEvent::BackupFinished { id, result } => match result {
            BackupResult::Created(path) => format!("{id}: backup written to {}", path.display()),
            BackupResult::NoFilesFound => format!("{id}: no save files found"),
            BackupResult::Failed(e) => format!("{id}: backup failed: {e}"),
        },
    }
}

fn backup_summary(result: &BackupResult) -> serde_json::Value {
    match result {
        BackupResult::Created(path) => serde_json::json!({
            "status": "created",
            "path": path.to_string_lossy(),
        }),
        BackupResult::NoFilesFound => serde_json::json!({ "status": "noFilesFound" }),
        BackupResult::Failed(e) => serde_json::json!({ "status": "failed", "error": e }),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamevault_protocol::AssetCategory;
    use std::path::PathBuf;

    fn test_config(root: &std::path::Path) -> Config {
        Config {
            backup_root: root.join("backups"),
            local_roots: vec![root.join("games")],
            catalog_path: root.join("missing.db"),
            cache_root: root.join("cache"),
            fetch_timeout_secs: 1,
        }
    }

    #[test]
    fn describes_events() {
        let progress = LibraryEvent::BackupProgress {
            id: "42".into(),
            percent: 49.6,
        };
        assert_eq!(describe(&progress), "42: 50%");

        let cached = LibraryEvent::AssetCached {
            id: "42".into(),
            category: AssetCategory::Hero,
        };
        assert_eq!(describe(&cached), format!("{} cached for 42", AssetCategory::Hero.dir_name()));

        let finished = LibraryEvent::BackupFinished {
            id: "42".into(),
            result: BackupResult::NoFilesFound,
        };
        assert_eq!(describe(&finished), "42: no save files found");
    }

    #[test]
    fn backup_summary_shapes() {
        let created = backup_summary(&BackupResult::Created(PathBuf::from("/b/x.zip")));
        assert_eq!(created["status"], "created");
        assert_eq!(created["path"], "/b/x.zip");

        let failed = backup_summary(&BackupResult::Failed("disk full".into()));
        assert_eq!(failed["status"], "failed");
        assert_eq!(failed["error"], "disk full");
    }

    #[tokio::test]
    async fn drain_counts_ready_assets_until_closed() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(LibraryEvent::IconReady {
            id: "a".into(),
            data_url: "data:image/png;base64,".into(),
        })
        .await
        .unwrap();
        tx.send(LibraryEvent::BackupProgress {
            id: "a".into(),
            percent: 100.0,
        })
        .await
        .unwrap();
        drop(tx);

        assert_eq!(drain_events(rx).await, 1);
    }

    #[tokio::test]
    async fn missing_catalog_yields_an_empty_library() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let (library, _events) = build_library(&config).unwrap();

        // Local roots hold nothing and the catalog file is absent; any Steam
        // games on this machine are unmatched without a catalog.
        let summary = library.dashboard().await.unwrap();
        assert_eq!(summary.total_games, 0);
        assert!(summary.recent_activity.is_empty());
        assert_eq!(library.backup_root(), config.backup_root);
    }

    fn write_catalog(path: &std::path::Path, title: &str, folder: &str) {
        let conn = rusqlite::Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE games (title TEXT, steam_id INTEGER, install_folder TEXT, save_location TEXT);",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO games VALUES (?1, NULL, ?2, '{}')",
            rusqlite::params![title, folder],
        )
        .unwrap();
    }

    #[tokio::test]
    async fn scan_leaves_icons_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        write_catalog(&config.catalog_path, "Game", "Game");
        let install = config.local_roots[0].join("Game");
        std::fs::create_dir_all(&install).unwrap();
        std::fs::write(
            install.join("Game.exe"),
            gamevault_scanner::fixtures::pe_with_icon(32),
        )
        .unwrap();

        let (library, _events) = build_library(&config).unwrap();
        assert_eq!(library.installed_games().await.unwrap().len(), 1);
        drop(library);

        run(config.clone(), Commands::Scan).await.unwrap();
        assert!(!config.cache_root.exists());

        run(config.clone(), Commands::Icons).await.unwrap();
        assert!(config.cache_root.join(AssetCategory::Icon.dir_name()).join("Game.png").is_file());
    }

    #[tokio::test]
    async fn assets_for_unknown_local_game_are_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        run(config.clone(), Commands::Assets { id: "nope".into() }).await.unwrap();
        assert!(!config.cache_root.exists());
        assert!(!config.backup_root.exists());
    }

    #[tokio::test]
    async fn unknown_game_commands_fail() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let result = run(config.clone(), Commands::Details { id: "nope".into() }).await;
        assert!(result.is_err());
        let result = run(config, Commands::Backup { id: "nope".into() }).await;
        assert!(result.is_err());
    }
}
