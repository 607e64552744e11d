use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::StreamExt;
use gamevault_protocol::AssetCategory;
use tokio::io::AsyncWriteExt;

use crate::CacheError;
use crate::fetch::{BodyStream, HttpFetch};

/// Category-keyed image cache on disk.
pub struct AssetCache {
    root: PathBuf,
    fetcher: Arc<dyn HttpFetch>,
}

impl AssetCache {
    pub fn new(root: impl Into<PathBuf>, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            root: root.into(),
            fetcher,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `<root>/<category>/<id>.<ext>`. The file may not exist.
    pub fn path_for(&self, category: AssetCategory, id: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.{}", cache_key(id), category.extension()))
    }

    /// True if a non-empty file is cached for this key.
    pub fn has_cached(&self, category: AssetCategory, id: &str) -> bool {
        std::fs::metadata(self.path_for(category, id))
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Returns the cached file as a `data:` URL.
    pub fn get_as_base64(&self, category: AssetCategory, id: &str) -> Option<String> {
        let path = self.path_for(category, id);
        let data = match std::fs::read(&path) {
            Ok(data) if !data.is_empty() => data,
            Ok(_) => return None,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read cached asset");
                }
                return None;
            }
        };
        Some(format!(
            "data:{};base64,{}",
            category.mime_type(),
            STANDARD.encode(data)
        ))
    }

    /// Stores `data` for this key, replacing any existing file.
    pub fn save_bytes(
        &self,
        category: AssetCategory,
        id: &str,
        data: &[u8],
    ) -> Result<(), CacheError> {
        if data.is_empty() {
            return Err(CacheError::EmptyBody);
        }
        let dest = self.path_for(category, id);
        let part = self.part_path(category, id);
        std::fs::create_dir_all(self.category_dir(category))?;

        let result = std::fs::write(&part, data).and_then(|()| std::fs::rename(&part, &dest));
        if let Err(e) = result {
            let _ = std::fs::remove_file(&part);
            return Err(e.into());
        }
        tracing::debug!(path = %dest.display(), bytes = data.len(), "cached asset");
        Ok(())
    }

    /// Downloads `url` into the cache unless the key is already cached.
    ///
    /// Returns `true` when the asset is cached afterwards. Failures are
    /// logged and leave nothing behind.
    pub async fn fetch_from_url(&self, category: AssetCategory, id: &str, url: &str) -> bool {
        if self.has_cached(category, id) {
            return true;
        }

        match self.download(category, id, url).await {
            Ok(bytes) => {
                tracing::info!(%category, id, bytes, "downloaded asset");
                true
            }
            Err(e) => {
                tracing::warn!(%category, id, url, error = %e, "asset download failed");
                false
            }
        }
    }

    /// Removes every cached file.
    pub fn clear(&self) -> Result<(), CacheError> {
        for category in AssetCategory::all() {
            let dir = self.category_dir(*category);
            if dir.exists() {
                std::fs::remove_dir_all(&dir)?;
            }
        }
        Ok(())
    }

    /// Total size of cached files in bytes.
    pub fn size_bytes(&self) -> u64 {
        AssetCategory::all()
            .iter()
            .map(|c| dir_size(&self.category_dir(*c)))
            .sum()
    }

    fn category_dir(&self, category: AssetCategory) -> PathBuf {
        self.root.join(category.dir_name())
    }

    fn part_path(&self, category: AssetCategory, id: &str) -> PathBuf {
        self.category_dir(category).join(format!(
            ".{}.{}.part",
            cache_key(id),
            uuid::Uuid::new_v4().simple()
        ))
    }

    async fn download(
        &self,
        category: AssetCategory,
        id: &str,
        url: &str,
    ) -> Result<u64, CacheError> {
        let response = self.fetcher.get(url).await?;
        if !response.is_success() {
            return Err(CacheError::Status(response.status));
        }

        tokio::fs::create_dir_all(self.category_dir(category)).await?;
        let part = self.part_path(category, id);

        let result = match write_body(&part, response.body).await {
            Ok(0) => Err(CacheError::EmptyBody),
            Ok(bytes) => tokio::fs::rename(&part, self.path_for(category, id))
                .await
                .map(|()| bytes)
                .map_err(CacheError::from),
            Err(e) => Err(e),
        };

        if result.is_err() {
            let _ = tokio::fs::remove_file(&part).await;
        }
        result
    }
}

async fn write_body(path: &Path, mut body: BodyStream) -> Result<u64, CacheError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Keeps ids from escaping their category directory.
fn cache_key(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

/// Recursively sums file sizes.
fn dir_size(dir: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                dir_size(&path)
            } else {
                entry.metadata().map(|m| m.len()).unwrap_or(0)
            }
        })
        .sum()
}
