//! # murima-media — Listing Image Storage
//!
//! Object storage behind a small async trait so handlers stay independent
//! of the backing store. Keys are namespaced per uploader:
//!
//! ```text
//! {folder}/{user_id}/{millis}.{ext}
//! ```
//!
//! so a user can only ever collide with their own uploads, and a folder
//! sweep for one user touches nobody else's files.
//!
//! [`upload_all`] is the batch entry point used by listing creation: it is
//! all-or-nothing from the caller's perspective. If any file fails, the
//! files already stored are deleted on a best-effort basis and the error
//! names the file that failed, so no listing is ever created with a partial
//! image set.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use murima_core::UserId;
use parking_lot::RwLock;

/// Storage failure, carrying the object key where one exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("failed to upload {file}: {reason}")]
    UploadFailed { file: String, reason: String },
    #[error("file {0:?} has no extension")]
    MissingExtension(String),
    #[error("object {0} not found")]
    NotFound(String),
}

/// One file submitted for upload: the client-side name and the bytes.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// An object store holding public listing images.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` at `key` in `bucket`, returning the public URL.
    async fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<String, MediaError>;

    /// Delete the object at `key`. Deleting a missing key is an error.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), MediaError>;
}

/// Build the object key for an upload: `{folder}/{user_id}/{millis}-{seq}.{ext}`.
///
/// The extension is taken from the submitted file name; a name without one
/// is rejected before any bytes move. The sequence number keeps files from
/// the same batch distinct even when they land in the same millisecond.
pub fn object_key(folder: &str, user: UserId, file_name: &str) -> Result<String, MediaError> {
    static SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && !ext.contains('/'))
        .ok_or_else(|| MediaError::MissingExtension(file_name.to_string()))?;
    let seq = SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    Ok(format!(
        "{folder}/{user}/{}-{seq}.{ext}",
        Utc::now().timestamp_millis()
    ))
}

/// Upload every file or none of them.
///
/// Files are stored in submission order and the returned URLs preserve that
/// order, so the first URL is the listing's primary image. On failure the
/// already-stored objects are deleted (best effort) before the error is
/// returned.
pub async fn upload_all(
    store: &dyn MediaStore,
    bucket: &str,
    folder: &str,
    user: UserId,
    files: &[UploadFile],
) -> Result<Vec<String>, MediaError> {
    // Reject bad names before storing anything.
    let mut keys = Vec::with_capacity(files.len());
    for file in files {
        keys.push(object_key(folder, user, &file.name)?);
    }

    let mut stored: Vec<String> = Vec::with_capacity(files.len());
    let mut urls = Vec::with_capacity(files.len());
    for (file, key) in files.iter().zip(&keys) {
        match store.put(bucket, key, &file.bytes).await {
            Ok(url) => {
                stored.push(key.clone());
                urls.push(url);
            }
            Err(err) => {
                tracing::warn!(file = %file.name, %err, "batch upload failed, rolling back");
                for key in &stored {
                    if let Err(cleanup) = store.delete(bucket, key).await {
                        tracing::warn!(%key, %cleanup, "rollback delete failed");
                    }
                }
                return Err(MediaError::UploadFailed {
                    file: file.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(urls)
}

/// In-memory object store. Backs tests and single-node deployments where
/// no external object storage is configured.
#[derive(Clone, Default)]
pub struct InMemoryMediaStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Key fragments that fail on `put`, for exercising rollback paths in
    /// tests.
    failing: Arc<RwLock<Vec<String>>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `put` whose object key contains `fragment` fail. Keys end
    /// with the submitted file's extension, so an extension makes a handy
    /// fragment.
    pub fn fail_keys_containing(&self, fragment: &str) {
        self.failing.write().push(fragment.to_string());
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<String, MediaError> {
        for fragment in self.failing.read().iter() {
            if key.contains(fragment.as_str()) {
                return Err(MediaError::UploadFailed {
                    file: key.to_string(),
                    reason: "injected failure".to_string(),
                });
            }
        }
        self.objects
            .write()
            .insert(format!("{bucket}/{key}"), bytes.to_vec());
        Ok(format!("memory://{bucket}/{key}"))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), MediaError> {
        self.objects
            .write()
            .remove(&format!("{bucket}/{key}"))
            .map(|_| ())
            .ok_or_else(|| MediaError::NotFound(format!("{bucket}/{key}")))
    }
}
