//! Blob store abstraction
//!
//! The remote object store behind attachment uploads. Only success and
//! failure are visible here; retry policy belongs to the backend.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use convoy_core::AttachmentId;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Blob store errors
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Upload rejected: {0}")]
    Rejected(String),
    #[error("Blob store unavailable: {0}")]
    Unavailable(String),
}

pub type BlobResult<T> = Result<T, BlobError>;

/// A successfully stored object
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Identifier used for later deletion
    pub id: AttachmentId,
    /// Remote key the object was stored under
    pub key: String,
}

/// Blob store trait - unified interface over the remote object store
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a file, returning its identifier and remote key
    async fn put_object(
        &self,
        name: &str,
        content_type: &str,
        data: Bytes,
    ) -> BlobResult<StoredObject>;

    /// Delete a previously stored object by identifier
    async fn delete_object(&self, id: &str) -> BlobResult<()>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

/// Generate a remote key for a file name
pub fn generate_key(name: &str) -> String {
    let uuid = Uuid::new_v4();
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    if ext.is_empty() {
        format!("{}", uuid)
    } else {
        format!("{}.{}", uuid, ext)
    }
}

/// In-memory blob store for tests and local runs
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<AttachmentId, (String, Bytes)>>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.objects.read().await.contains_key(id)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_object(
        &self,
        name: &str,
        _content_type: &str,
        data: Bytes,
    ) -> BlobResult<StoredObject> {
        let key = generate_key(name);
        let id = Uuid::new_v4().to_string();

        let mut objects = self.objects.write().await;
        objects.insert(id.clone(), (key.clone(), data));
        debug!(id = %id, key = %key, "Object stored");

        Ok(StoredObject { id, key })
    }

    async fn delete_object(&self, id: &str) -> BlobResult<()> {
        let mut objects = self.objects.write().await;
        objects.remove(id);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
