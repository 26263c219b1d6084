//! External-service contracts (using traits for testability)

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// Object-storage client contract.
///
/// Uploads and deletes are consumed by profile management; `presign` turns a
/// stored blob key into a time-limited public URL at read time. Presigned
/// URLs are never persisted.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key`, returning the stored key.
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String>;

    /// Remove the object stored under `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Resolve `key` to a time-limited external access URL.
    async fn presign(&self, key: &str, ttl: Duration) -> Result<String>;
}
