use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, Row, params};

use crate::CatalogError;
use crate::entry::CatalogEntry;
use crate::lookup::CatalogLookup;

const SELECT_COLUMNS: &str = "SELECT title, steam_id, install_folder, save_location FROM games";

/// Catalog backed by a SQLite file with a `games` table.
///
/// Each query opens its own read-only connection, so the catalog can be
/// shared across threads without locking.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    path: PathBuf,
}

impl SqliteCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, CatalogError> {
        if !self.path.is_file() {
            return Err(CatalogError::NotFound(self.path.clone()));
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

impl CatalogLookup for SqliteCatalog {
    fn find_by_folder(&self, folder: &str) -> Result<Option<CatalogEntry>, CatalogError> {
        let conn = self.open()?;
        // LIKE narrows the rows; the exact alias check happens in Rust.
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE install_folder LIKE '%' || ?1 || '%' ORDER BY rowid"
        ))?;
        let rows = stmt.query_map(params![folder], row_to_entry)?;

        for row in rows {
            let entry = row?;
            if entry.matches_folder(folder) {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    fn all_entries(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY rowid"))?;
        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(path = %self.path.display(), count = entries.len(), "loaded catalog");
        Ok(entries)
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<CatalogEntry> {
    let title: String = row.get(0)?;
    let steam_id: Option<i64> = row.get(1)?;
    let steam_id = steam_id.and_then(|id| match u32::try_from(id) {
        Ok(0) => None,
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!(title = %title, id, "ignoring out-of-range steam_id");
            None
        }
    });

    Ok(CatalogEntry {
        title,
        steam_id,
        install_folder: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        save_location: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_db(rows: &[(&str, Option<i64>, &str, &str)]) -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("database.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE games (
                title TEXT NOT NULL,
                steam_id INTEGER,
                install_folder TEXT,
                save_location TEXT
            );",
        )
        .unwrap();
        for (title, steam_id, folder, saves) in rows {
            conn.execute(
                "INSERT INTO games (title, steam_id, install_folder, save_location) VALUES (?1, ?2, ?3, ?4)",
                params![title, steam_id, folder, saves],
            )
            .unwrap();
        }
        (tmp, path)
    }

    #[test]
    fn find_by_exact_alias() {
        let (_tmp, path) = create_db(&[
            ("Example Deluxe", None, "ExampleGameDeluxe", "{}"),
            ("Example", Some(42), "Example;ExampleGame", r#"{"win": []}"#),
        ]);
        let catalog = SqliteCatalog::new(&path);

        let found = catalog.find_by_folder("ExampleGame").unwrap().unwrap();
        assert_eq!(found.title, "Example");
        assert_eq!(found.steam_id, Some(42));

        // Substring of an alias is not a match.
        assert!(catalog.find_by_folder("Game").unwrap().is_none());
    }

    #[test]
    fn all_entries_in_storage_order() {
        let (_tmp, path) = create_db(&[
            ("B", None, "b", ""),
            ("A", Some(7), "a", ""),
        ]);
        let entries = SqliteCatalog::new(&path).all_entries().unwrap();
        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn invalid_steam_ids_become_none() {
        let (_tmp, path) = create_db(&[("Neg", Some(-1), "neg", ""), ("Zero", Some(0), "zero", "")]);
        let entries = SqliteCatalog::new(&path).all_entries().unwrap();
        assert!(entries.iter().all(|e| e.steam_id.is_none()));
    }

    #[test]
    fn null_columns_default_to_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("db.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE games (title TEXT, steam_id INTEGER, install_folder TEXT, save_location TEXT);
             INSERT INTO games VALUES ('Bare', NULL, NULL, NULL);",
        )
        .unwrap();
        drop(conn);

        let entries = SqliteCatalog::new(&path).all_entries().unwrap();
        assert_eq!(entries[0].install_folder, "");
        assert_eq!(entries[0].save_location, "");
    }

    #[test]
    fn missing_database_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = SqliteCatalog::new(tmp.path().join("absent.db"));
        assert!(matches!(catalog.all_entries(), Err(CatalogError::NotFound(_))));
        assert!(matches!(
            catalog.find_by_folder("x"),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn missing_table_is_database_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER);")
            .unwrap();
        let err = SqliteCatalog::new(&path).all_entries().unwrap_err();
        assert!(matches!(err, CatalogError::Database(_)));
    }
}
