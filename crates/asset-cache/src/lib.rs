//! Artwork cache for GameVault.
//!
//! Images live under `<root>/{icon,hero,logo}/<id>.<ext>`. A non-empty file
//! is treated as valid forever; downloads land in a temporary `.part` file
//! and are renamed into place only when complete.

pub mod cache;
pub mod fetch;

// Re-export primary types.
pub use cache::AssetCache;
pub use fetch::{BodyStream, DEFAULT_TIMEOUT, FetchResponse, HttpFetch, ReqwestFetcher, USER_AGENT};

/// Errors from cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("transfer failed: {0}")]
    Transport(String),

    #[error("empty response body")]
    EmptyBody,
}
