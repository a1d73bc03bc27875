//! Binary media storage.
//!
//! Profile pictures and post media are uploaded to an object store before
//! the record that references them is written. The store hands back a
//! stable URL; deleting that URL is the compensating action when the
//! follow-up write fails.

mod http;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpObjectStore;

/// Fixed top-level folders in the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    PostImages,
    PostVideos,
    ProfilePictures,
}

impl Folder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::PostImages => "post-images",
            Folder::PostVideos => "post-videos",
            Folder::ProfilePictures => "profile-pictures",
        }
    }
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read a local file, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        })
    }

    /// Video by MIME type; everything else goes in as an image.
    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Storage rejected the request ({status})")]
    Rejected { status: u16 },

    #[error("Storage response carried no URL")]
    MissingUrl,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `upload` under `folder` and return its public URL.
    async fn upload(&self, folder: Folder, upload: &Upload) -> Result<String, StorageError>;

    /// Remove an object previously returned by [`upload`](Self::upload).
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}
