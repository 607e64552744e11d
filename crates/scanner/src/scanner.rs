use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamevault_catalog::entry::WINDOWS;
use gamevault_catalog::{AliasIndex, CatalogEntry, CatalogLookup};
use gamevault_protocol::{GameSource, ResolvedGame};
use gamevault_resolver::{Resolution, TemplateResolver};

use crate::validity::{local_install_is_valid, steam_install_is_valid};

/// Directories the scanner walks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRoots {
    /// Steam library roots (the folder containing `steamapps`).
    pub steam_libraries: Vec<PathBuf>,
    /// User-chosen folders whose subdirectories are game installs.
    pub local_roots: Vec<PathBuf>,
}

impl ScanRoots {
    /// Detects Steam libraries on this machine and adds `local_roots`.
    ///
    /// A missing or unreadable Steam install just yields no libraries.
    pub fn detect(local_roots: Vec<PathBuf>) -> Self {
        let steam_libraries = match gamevault_steam::Paths::new() {
            Ok(paths) => gamevault_steam::library_paths(&paths).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to read Steam libraries");
                Vec::new()
            }),
            Err(e) => {
                tracing::debug!(error = %e, "Steam not found");
                Vec::new()
            }
        };

        Self {
            steam_libraries,
            local_roots,
        }
    }
}

enum Origin<'a> {
    Steam { library: &'a Path },
    Local,
}

/// Finds installed games by matching folders against the catalog.
pub struct GameScanner {
    resolver: TemplateResolver,
    catalog: Arc<dyn CatalogLookup>,
    roots: ScanRoots,
}

impl GameScanner {
    pub fn new(
        resolver: TemplateResolver,
        catalog: Arc<dyn CatalogLookup>,
        roots: ScanRoots,
    ) -> Self {
        Self {
            resolver,
            catalog,
            roots,
        }
    }

    pub fn roots(&self) -> &ScanRoots {
        &self.roots
    }

    /// Scans every root. Steam libraries come first, then local roots, each
    /// in folder-name order. Ids are unique; the first occurrence wins.
    pub fn scan_all(&self) -> Vec<ResolvedGame> {
        let entries = self.catalog.all_entries().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "catalog unavailable, scanning with an empty catalog");
            Vec::new()
        });
        let index = AliasIndex::build(entries);

        let mut games = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |game: ResolvedGame| {
            if seen.insert(game.id.clone()) {
                games.push(game);
            } else {
                tracing::debug!(id = %game.id, path = %game.install_path, "duplicate game id skipped");
            }
        };

        for library in &self.roots.steam_libraries {
            for folder in subdirectories(&gamevault_steam::common_dir(library)) {
                if let Some(game) = self.match_folder(&index, &folder, Origin::Steam { library }) {
                    push(game);
                }
            }
        }

        for root in &self.roots.local_roots {
            for folder in subdirectories(root) {
                if let Some(game) = self.match_folder(&index, &folder, Origin::Local) {
                    push(game);
                }
            }
        }

        tracing::info!(count = games.len(), "scan complete");
        games
    }

    /// Scans and returns the game with the given id.
    pub fn find_game(&self, id: &str) -> Option<ResolvedGame> {
        self.scan_all().into_iter().find(|g| g.id == id)
    }

    fn match_folder(
        &self,
        index: &AliasIndex,
        folder: &Path,
        origin: Origin<'_>,
    ) -> Option<ResolvedGame> {
        let alias = folder.file_name()?.to_str()?;
        let entry = index.lookup(alias)?;

        let (valid, source) = match origin {
            Origin::Steam { library } => (
                steam_install_is_valid(library, entry.steam_id),
                GameSource::Steam,
            ),
            Origin::Local => (local_install_is_valid(folder), GameSource::Local),
        };
        if !valid {
            tracing::trace!(folder = %folder.display(), title = %entry.title, "not a live install");
            return None;
        }

        let save_paths = match self.resolve_saves(entry, folder) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!(title = %entry.title, error = %e, "skipping game with bad save data");
                return None;
            }
        };

        Some(ResolvedGame {
            id: entry
                .steam_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| alias.to_string()),
            name: entry.title.clone(),
            steam_id: entry.steam_id,
            install_path: folder.to_string_lossy().into_owned(),
            save_paths,
            source,
            icon: None,
        })
    }

    fn resolve_saves(
        &self,
        entry: &CatalogEntry,
        folder: &Path,
    ) -> Result<Vec<String>, gamevault_catalog::CatalogError> {
        let mut paths = Vec::new();
        for template in entry.save_templates(WINDOWS)? {
            match self.resolver.resolve(&template, Some(folder)) {
                Resolution::Resolved(path) => paths.push(path.to_string_lossy().into_owned()),
                Resolution::BestEffort(guess) => {
                    tracing::warn!(title = %entry.title, template, guess, "save path left unresolved");
                }
            }
        }
        Ok(paths)
    }
}

/// Lists the immediate subdirectories of `root`, sorted by name.
fn subdirectories(root: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(root = %root.display(), error = %e, "scan root unavailable");
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}
