//! Test doubles for external-service contracts.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::traits::BlobStore;

/// In-memory [`BlobStore`] for tests.
///
/// Keys registered via [`fail_on`](Self::fail_on) make the corresponding
/// operation error, which lets tests exercise the all-or-nothing contract of
/// batch URL resolution.
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `key` fail.
    pub fn fail_on(self, key: &str) -> Self {
        self.failing.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    fn check(&self, key: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(key) {
            bail!("blob store error for key {key}");
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String> {
        self.check(key)?;
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(key.to_string())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check(key)?;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presign(&self, key: &str, ttl: Duration) -> Result<String> {
        self.check(key)?;
        Ok(format!("https://blob.test/{}?expires={}", key, ttl.as_secs()))
    }
}
