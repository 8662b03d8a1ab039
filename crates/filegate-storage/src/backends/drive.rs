//! Consumer-drive storage backend.
//!
//! Objects are created in a single call that carries metadata and the
//! streamed body as one multipart/related request; the service assigns the
//! object identifier and the client library never drives chunking itself.
//! After a successful create the backend can grant public read access as a
//! best-effort follow-up.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use filegate_core::config::storage::DriveBackendConfig;
use filegate_core::result::AppResult;
use filegate_core::traits::storage::{
    ByteStream, NewDriveObject, ObjectEntry, ObjectPage, StorageBackend, StreamedStore,
};

use super::{AccessCredential, body_stream, ensure_success, transport};

/// Consumer-drive storage backend.
#[derive(Debug, Clone)]
pub struct DriveBackend {
    client: reqwest::Client,
    config: DriveBackendConfig,
    credential: AccessCredential,
}

/// Response of a file create call.
#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// One page of a drive listing. The drive API reports sizes as strings.
#[derive(Debug, Deserialize)]
struct DriveList {
    #[serde(default)]
    files: Vec<DriveListEntry>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveListEntry {
    name: String,
    size: Option<String>,
}

impl DriveBackend {
    /// Create a backend bound to one drive folder.
    pub fn new(
        client: reqwest::Client,
        config: DriveBackendConfig,
        credential: AccessCredential,
    ) -> Self {
        Self {
            client,
            config,
            credential,
        }
    }

    fn file_url(&self, id: &str) -> String {
        format!("{}/files/{id}", self.config.api_base_url.trim_end_matches('/'))
    }

    /// Metadata JSON for a new object, scoped to the configured folder.
    fn create_metadata(&self, object: &NewDriveObject) -> serde_json::Value {
        let mut metadata = serde_json::Map::new();
        metadata.insert("name".into(), object.name.clone().into());
        if let Some(mime) = &object.mime_type {
            metadata.insert("mimeType".into(), mime.clone().into());
        }
        if !self.config.folder_id.is_empty() {
            metadata.insert(
                "parents".into(),
                serde_json::Value::Array(vec![self.config.folder_id.clone().into()]),
            );
        }
        serde_json::Value::Object(metadata)
    }
}

/// Opening part of a multipart/related create request: the metadata part
/// followed by the media part header.
fn multipart_prefix(boundary: &str, metadata: &serde_json::Value, mime_type: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Type: {mime_type}\r\n\r\n"
    )
}

#[async_trait]
impl StorageBackend for DriveBackend {
    fn backend_type(&self) -> &str {
        "drive"
    }

    async fn read(&self, key: &str) -> AppResult<ByteStream> {
        let response = self
            .client
            .get(self.file_url(key))
            .query(&[("alt", "media")])
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
        debug!(id = key, "Deleted drive object");
        Ok(())
    }

    async fn list_page(&self, marker: Option<&str>) -> AppResult<ObjectPage> {
        let mut request = self
            .client
            .get(format!(
                "{}/files",
                self.config.api_base_url.trim_end_matches('/')
            ))
            .query(&[
                ("pageSize", "100"),
                ("fields", "files(id,name,size),nextPageToken"),
            ])
            .header("authorization", self.credential.bearer());
        if !self.config.folder_id.is_empty() {
            request = request.query(&[("q", format!("'{}' in parents", self.config.folder_id))]);
        }
        if let Some(marker) = marker {
            request = request.query(&[("pageToken", marker)]);
        }

        let response = request.send().await.map_err(|e| transport("list", e))?;
        let response = ensure_success("list", &self.config.folder_id, response).await?;

        let page: DriveList = response.json().await.map_err(|e| transport("list", e))?;
        Ok(ObjectPage {
            entries: page
                .files
                .into_iter()
                .map(|f| ObjectEntry {
                    name: f.name,
                    size_bytes: f.size.and_then(|s| s.parse().ok()),
                    is_directory: false,
                })
                .collect(),
            next_marker: page.next_page_token,
        })
    }
}

#[async_trait]
impl StreamedStore for DriveBackend {
    async fn create_with_body(
        &self,
        object: &NewDriveObject,
        body: ByteStream,
    ) -> AppResult<String> {
        let boundary = format!("filegate-{}", Uuid::new_v4());
        let metadata = self.create_metadata(object);
        let mime_type = object.mime_type.as_deref().unwrap_or("application/octet-stream");

        let prefix = Bytes::from(multipart_prefix(&boundary, &metadata, mime_type));
        let suffix = Bytes::from(format!("\r\n--{boundary}--\r\n"));
        let request_body = stream::once(std::future::ready(Ok::<_, std::io::Error>(prefix)))
            .chain(body)
            .chain(stream::once(std::future::ready(Ok(suffix))));

        let response = self
            .client
            .post(format!(
                "{}/files",
                self.config.upload_base_url.trim_end_matches('/')
            ))
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header("authorization", self.credential.bearer())
            .header(
                "content-type",
                format!("multipart/related; boundary={boundary}"),
            )
            .body(reqwest::Body::wrap_stream(request_body))
            .send()
            .await
            .map_err(|e| transport("create", e))?;

        let response = ensure_success("create", &object.name, response).await?;
        let created: DriveFile = response.json().await.map_err(|e| transport("create", e))?;

        debug!(name = %object.name, id = %created.id, "Created drive object");
        Ok(created.id)
    }

    async fn grant_public_read(&self, id: &str) -> AppResult<()> {
        let response = self
            .client
            .post(format!("{}/permissions", self.file_url(id)))
            .header("authorization", self.credential.bearer())
            .json(&serde_json::json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .map_err(|e| transport("grant_public_read", e))?;

        ensure_success("grant_public_read", id, response).await?;
        debug!(id, "Granted public read");
        Ok(())
    }
}
