use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use crate::config::StorageConfig;
use crate::storage::{Folder, ObjectStore, StorageError, Upload};

#[derive(Deserialize)]
struct Stored {
    url: Option<String>,
}

/// Object store reached over plain HTTP.
///
/// `POST {base}/{folder}/{name}{uuid}` with the raw bytes answers
/// `{"url": ...}`; `DELETE` on that URL removes it.
#[derive(Clone)]
pub struct HttpObjectStore {
    http: Client,
    base_url: String,
}

impl HttpObjectStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self::with_client(Client::new(), &config.base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_url(&self, folder: Folder, file_name: &str) -> String {
        // The suffix keeps repeated uploads of the same file name apart.
        let name = format!("{}{}", file_name, uuid::Uuid::new_v4());
        format!(
            "{}/{}/{}",
            self.base_url,
            folder.as_str(),
            urlencoding::encode(&name)
        )
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(&self, folder: Folder, upload: &Upload) -> Result<String, StorageError> {
        let target = self.object_url(folder, &upload.file_name);
        let response = self
            .http
            .post(&target)
            .header(CONTENT_TYPE, &upload.content_type)
            .body(upload.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(folder = folder.as_str(), status = status.as_u16(), "Upload rejected");
            return Err(StorageError::Rejected {
                status: status.as_u16(),
            });
        }

        let stored: Stored = response.json().await?;
        let url = stored.url.ok_or(StorageError::MissingUrl)?;
        tracing::info!(folder = folder.as_str(), size = upload.bytes.len(), "Uploaded media");
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let response = self.http.delete(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Rejected {
                status: status.as_u16(),
            });
        }
        tracing::debug!(url = %url, "Deleted media");
        Ok(())
    }
}
