// ============================
// linkbranch-backend/src/blob.rs
// ============================
//! Storage for uploaded profile images.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::fs;
use uuid::Uuid;

use crate::config::UPLOADS_DIR;

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// An image received from a client
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Where a stored image can be fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub url: String,
    /// Identifier used to delete the blob again
    pub public_id: String,
}

/// Trait for image stores
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an image; `None` when it could not be stored
    async fn upload(&self, upload: Upload) -> Option<StoredBlob>;

    /// Best-effort removal of a previously stored image, by public URL
    async fn delete(&self, url: &str);
}

/// Writes images to a local directory served under `/uploads`
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new<P: AsRef<Path>>(dir: P, public_base_url: &str) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, public_id: &str) -> String {
        format!("{}/{UPLOADS_DIR}/{public_id}", self.public_base_url)
    }
}

/// Lowercased extension of an accepted image file name
fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Extract the stored file name from a public URL produced by this store
pub fn public_id_from_url(url: &str) -> Option<&str> {
    let (_, public_id) = url.rsplit_once(&format!("/{UPLOADS_DIR}/"))?;
    let valid = !public_id.is_empty()
        && !public_id.contains(['/', '\\'])
        && !public_id.starts_with('.');
    valid.then_some(public_id)
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, upload: Upload) -> Option<StoredBlob> {
        if upload.bytes.is_empty() {
            tracing::debug!(file = %upload.file_name, "empty upload rejected");
            return None;
        }
        let Some(ext) = image_extension(&upload.file_name) else {
            tracing::debug!(file = %upload.file_name, "unsupported image type");
            return None;
        };

        let public_id = format!("{}.{ext}", Uuid::new_v4());
        if let Err(e) = fs::write(self.dir.join(&public_id), &upload.bytes).await {
            tracing::error!(error = %e, "failed to store upload");
            return None;
        }

        tracing::info!(public_id = %public_id, size = upload.bytes.len(), "image stored");
        Some(StoredBlob {
            url: self.url_for(&public_id),
            public_id,
        })
    }

    async fn delete(&self, url: &str) {
        let Some(public_id) = public_id_from_url(url) else {
            return;
        };
        if let Err(e) = fs::remove_file(self.dir.join(public_id)).await {
            tracing::warn!(error = %e, public_id, "failed to delete stored image");
        }
    }
}
