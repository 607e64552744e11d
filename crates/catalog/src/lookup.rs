use crate::CatalogError;
use crate::entry::CatalogEntry;

/// Read access to the game catalog.
pub trait CatalogLookup: Send + Sync {
    /// Finds the entry whose alias list contains `folder` exactly.
    fn find_by_folder(&self, folder: &str) -> Result<Option<CatalogEntry>, CatalogError>;

    /// Returns every entry, in storage order.
    fn all_entries(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// Catalog held in memory. Used by tests and callers that build entries
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    entries: Vec<CatalogEntry>,
}

impl MemoryCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

impl CatalogLookup for MemoryCatalog {
    fn find_by_folder(&self, folder: &str) -> Result<Option<CatalogEntry>, CatalogError> {
        Ok(self.entries.iter().find(|e| e.matches_folder(folder)).cloned())
    }

    fn all_entries(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self.entries.clone())
    }
}
