//! HTTP download seam.
//!
//! [`AssetCache`](crate::AssetCache) talks to the network only through
//! [`HttpFetch`], so tests can substitute a scripted fetcher.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::{Stream, StreamExt};

use crate::CacheError;

/// Timeout applied to a whole request, body included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Steam's CDN rejects some requests without a browser-like agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Streamed response body.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, CacheError>> + Send>>;

/// Status line and body of an HTTP response.
pub struct FetchResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP GET requests.
pub trait HttpFetch: Send + Sync {
    fn get(
        &self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResponse, CacheError>> + Send + '_>>;
}

/// [`HttpFetch`] backed by `reqwest` with rustls.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    /// Creates a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, CacheError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }
}

impl HttpFetch for ReqwestFetcher {
    fn get(
        &self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResponse, CacheError>> + Send + '_>> {
        let request = self.http.get(url);
        Box::pin(async move {
            let resp = request.send().await?;
            let status = resp.status().as_u16();
            let body = resp
                .bytes_stream()
                .map(|chunk| chunk.map(|b| b.to_vec()).map_err(CacheError::from));
            Ok(FetchResponse {
                status,
                body: Box::pin(body),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_timeout() {
        assert!(ReqwestFetcher::new(DEFAULT_TIMEOUT).is_ok());
    }

    #[test]
    fn success_range() {
        let response = |status| FetchResponse {
            status,
            body: Box::pin(futures_util::stream::empty()),
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(304).is_success());
        assert!(!response(404).is_success());
    }
}
