use std::collections::HashMap;

use crate::entry::CatalogEntry;

/// Alias → entry lookup built from a catalog snapshot.
///
/// When two entries claim the same alias the first one wins.
#[derive(Debug, Default)]
pub struct AliasIndex {
    entries: Vec<CatalogEntry>,
    by_alias: HashMap<String, usize>,
}

impl AliasIndex {
    pub fn build(entries: Vec<CatalogEntry>) -> Self {
        let mut by_alias: HashMap<String, usize> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            for alias in entry.aliases() {
                if let Some(&prev) = by_alias.get(alias) {
                    let prev: &CatalogEntry = &entries[prev];
                    tracing::debug!(
                        alias,
                        kept = %prev.title,
                        ignored = %entry.title,
                        "duplicate catalog alias"
                    );
                    continue;
                }
                by_alias.insert(alias.to_string(), i);
            }
        }
        Self { entries, by_alias }
    }

    /// Finds the entry owning `folder` as an alias.
    pub fn lookup(&self, folder: &str) -> Option<&CatalogEntry> {
        self.by_alias.get(folder).map(|&i| &self.entries[i])
    }

    /// Number of distinct aliases.
    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, folders: &str) -> CatalogEntry {
        CatalogEntry {
            title: title.into(),
            steam_id: None,
            install_folder: folders.into(),
            save_location: String::new(),
        }
    }

    #[test]
    fn every_alias_is_indexed() {
        let index = AliasIndex::build(vec![entry("Example", "Example;ExampleGame")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("Example").unwrap().title, "Example");
        assert_eq!(index.lookup("ExampleGame").unwrap().title, "Example");
        assert!(index.lookup("Other").is_none());
    }

    #[test]
    fn first_entry_wins_duplicates() {
        let index = AliasIndex::build(vec![entry("First", "Shared;A"), entry("Second", "Shared;B")]);
        assert_eq!(index.lookup("Shared").unwrap().title, "First");
        assert_eq!(index.lookup("B").unwrap().title, "Second");
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn empty_index() {
        let index = AliasIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.lookup("").is_none());
    }
}
