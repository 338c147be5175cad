//! Best-effort thumbnail downloads
//!
//! A failed download never fails the record it belongs to. The caller gets the
//! error back so it can report it, then carries on with the filename it already
//! computed.

use crate::assets::store::{AssetError, AssetResult, AssetStore};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;

/// Fetches remote images and hands them to an [`AssetStore`]
#[derive(Clone)]
pub struct AssetDownloader {
    client: Client,
    store: Arc<dyn AssetStore>,
}

impl AssetDownloader {
    pub fn new(client: Client, store: Arc<dyn AssetStore>) -> Self {
        Self { client, store }
    }

    /// Downloads `image_url` and stores it as `filename`
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the asset was written
    /// * `Err(AssetError)` - Non-success status, transport failure, or store failure
    pub async fn download(&self, image_url: &str, filename: &str) -> AssetResult<PathBuf> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|source| AssetError::Transport {
                url: image_url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: image_url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| AssetError::Transport {
                url: image_url.to_string(),
                source,
            })?;

        let path = self.store.put(filename, &bytes)?;
        tracing::debug!("Saved thumbnail {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FsAssetStore;
    use crate::config::CollisionPolicy;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader(dir: &std::path::Path) -> AssetDownloader {
        let store = FsAssetStore::new(dir, CollisionPolicy::Overwrite).unwrap();
        AssetDownloader::new(Client::new(), Arc::new(store))
    }

    #[tokio::test]
    async fn test_download_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thumb.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\xff\xd8\xff".to_vec()))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let saved = downloader(dir.path())
            .download(&format!("{}/thumb.jpg", server.uri()), "event.jpg")
            .await
            .unwrap();

        assert_eq!(saved, dir.path().join("event.jpg"));
        assert_eq!(std::fs::read(saved).unwrap(), b"\xff\xd8\xff");
    }

    #[tokio::test]
    async fn test_download_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let result = downloader(dir.path())
            .download(&format!("{}/missing.jpg", server.uri()), "event.jpg")
            .await;

        assert!(matches!(result, Err(AssetError::Status { status: 404, .. })));
        assert!(!dir.path().join("event.jpg").exists());
    }

    #[tokio::test]
    async fn test_download_transport_error() {
        let dir = tempdir().unwrap();
        let result = downloader(dir.path())
            .download("http://127.0.0.1:1/thumb.jpg", "event.jpg")
            .await;

        assert!(matches!(result, Err(AssetError::Transport { .. })));
    }
}
