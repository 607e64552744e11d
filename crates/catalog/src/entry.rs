use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Platform key for Windows save templates in `save_location`.
pub const WINDOWS: &str = "win";

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub steam_id: Option<u32>,
    /// `;`-separated install-folder aliases.
    pub install_folder: String,
    /// JSON object mapping a platform key to a list of path templates.
    pub save_location: String,
}

impl CatalogEntry {
    /// Install-folder aliases, trimmed, empty ones dropped.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.install_folder
            .split(';')
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// Returns true if `folder` is one of this entry's aliases (case-sensitive).
    pub fn matches_folder(&self, folder: &str) -> bool {
        self.aliases().any(|a| a == folder)
    }

    /// Decodes the save templates for `platform` (usually [`WINDOWS`]).
    ///
    /// A blank `save_location` or a missing platform key yields no templates.
    pub fn save_templates(&self, platform: &str) -> Result<Vec<String>, CatalogError> {
        if self.save_location.trim().is_empty() {
            return Ok(Vec::new());
        }

        let invalid = |reason: String| CatalogError::SaveLocation {
            title: self.title.clone(),
            reason,
        };

        let value: serde_json::Value =
            serde_json::from_str(&self.save_location).map_err(|e| invalid(e.to_string()))?;
        let serde_json::Value::Object(platforms) = value else {
            return Err(invalid("expected a JSON object".into()));
        };

        match platforms.get(platform) {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(serde_json::Value::String(t)) => Ok(vec![t.clone()]),
            Some(serde_json::Value::Array(items)) => Ok(items
                .iter()
                .filter_map(|v| v.as_str())
                .map(String::from)
                .collect()),
            Some(_) => Err(invalid(format!("\"{platform}\" is not a list of templates"))),
        }
    }
}
