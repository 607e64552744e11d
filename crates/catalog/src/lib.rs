//! Catalog of known games.
//!
//! Maps install-folder aliases to titles, Steam app ids and save-path
//! templates. The catalog is read-only from GameVault's point of view.

pub mod entry;
pub mod index;
pub mod lookup;
pub mod sqlite;

// Re-export primary types.
pub use entry::CatalogEntry;
pub use index::AliasIndex;
pub use lookup::{CatalogLookup, MemoryCatalog};
pub use sqlite::SqliteCatalog;

/// Errors for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog database not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid save_location for {title}: {reason}")]
    SaveLocation { title: String, reason: String },
}
