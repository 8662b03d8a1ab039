//! Network file-share storage backend.
//!
//! Objects live under `{service_url}/{share}/{directory}/{key}` and follow
//! an explicit two-phase lifecycle: the object is created at its final
//! size, then filled with ranged writes. Keys are caller-assigned.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;

use filegate_core::config::storage::ShareBackendConfig;
use filegate_core::result::AppResult;
use filegate_core::traits::storage::{
    ByteStream, ObjectEntry, ObjectPage, RangedStore, StorageBackend,
};

use super::{AccessCredential, body_stream, ensure_success, transport};

/// File-share storage backend.
#[derive(Debug, Clone)]
pub struct ShareBackend {
    client: reqwest::Client,
    config: ShareBackendConfig,
    credential: AccessCredential,
}

/// One page of the share's directory listing.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    entries: Vec<ListEntry>,
    next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
    size: Option<u64>,
    #[serde(default)]
    directory: bool,
}

impl ShareBackend {
    /// Create a backend bound to one share directory.
    pub fn new(
        client: reqwest::Client,
        config: ShareBackendConfig,
        credential: AccessCredential,
    ) -> Self {
        Self {
            client,
            config,
            credential,
        }
    }

    /// URL of the directory this backend writes into.
    fn directory_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.service_url.trim_end_matches('/'),
            self.config.share_name,
            self.config.directory_name,
        )
    }

    /// URL of one object within the directory.
    fn file_url(&self, key: &str) -> String {
        format!("{}/{}", self.directory_url(), key)
    }
}

#[async_trait]
impl StorageBackend for ShareBackend {
    fn backend_type(&self) -> &str {
        "share"
    }

    async fn read(&self, key: &str) -> AppResult<ByteStream> {
        let response = self
            .client
            .get(self.file_url(key))
            .header("authorization", self.credential.bearer())
            .send()
            .await
            .map_err(|e| transport("read", e))?;

        let response = ensure_success("read", key, response).await?;
        Ok(body_stream(response))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.file_url(key))
            .header("authorization", self.credential.bearer())
            .send()
            .await
            .map_err(|e| transport("delete", e))?;

        ensure_success("delete", key, response).await?;
        debug!(key, "Deleted share object");
        Ok(())
    }

    async fn list_page(&self, marker: Option<&str>) -> AppResult<ObjectPage> {
        let mut request = self
            .client
            .get(self.directory_url())
            .query(&[("comp", "list")])
            .header("authorization", self.credential.bearer());
        if let Some(marker) = marker {
            request = request.query(&[("marker", marker)]);
        }

        let response = request.send().await.map_err(|e| transport("list", e))?;
        let response = ensure_success("list", &self.config.directory_name, response).await?;

        let page: ListResponse = response.json().await.map_err(|e| transport("list", e))?;
        Ok(ObjectPage {
            entries: page
                .entries
                .into_iter()
                .map(|e| ObjectEntry {
                    name: e.name,
                    size_bytes: e.size,
                    is_directory: e.directory,
                })
                .collect(),
            next_marker: page.next_marker,
        })
    }
}

#[async_trait]
impl RangedStore for ShareBackend {
    async fn create(&self, key: &str, size: u64) -> AppResult<()> {
        let response = self
            .client
            .put(self.file_url(key))
            .header("authorization", self.credential.bearer())
            .header("x-file-type", "file")
            .header("x-content-length", size)
            .send()
            .await
            .map_err(|e| transport("create", e))?;

        ensure_success("create", key, response).await?;
        debug!(key, size, "Created share object");
        Ok(())
    }

    async fn write_range(&self, key: &str, offset: u64, data: Bytes) -> AppResult<()> {
        let end = offset + data.len() as u64 - 1;
        let response = self
            .client
            .put(self.file_url(key))
            .query(&[("comp", "range")])
            .header("authorization", self.credential.bearer())
            .header("x-range", format!("bytes={offset}-{end}"))
            .header("x-write", "update")
            .body(data)
            .send()
            .await
            .map_err(|e| transport("write_range", e))?;

        ensure_success("write_range", key, response).await?;
        Ok(())
    }
}
