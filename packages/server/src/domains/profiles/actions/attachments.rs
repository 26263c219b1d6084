//! Attachment URL resolution: storage keys → time-limited public URLs.
//!
//! Resolutions for one response fan out concurrently and are joined before
//! the response is assembled. The batch is all-or-nothing: if any single
//! resolution fails, the whole call fails and no partial map is returned.
//! Dropping the returned future (e.g. on request timeout) cancels all
//! in-flight resolutions with it.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use futures::future::try_join_all;

use crate::common::{AppError, AppResult};
use crate::kernel::BlobStore;

/// Resolve each storage key to a presigned URL, concurrently.
pub async fn resolve_urls(
    keys: impl IntoIterator<Item = String>,
    ttl: Duration,
    store: &dyn BlobStore,
) -> AppResult<HashMap<String, String>> {
    // Dedupe: the same key may appear for several recipients.
    let unique: BTreeSet<String> = keys.into_iter().collect();

    let resolutions = unique.into_iter().map(|key| async move {
        let url = store
            .presign(&key, ttl)
            .await
            .map_err(AppError::Internal)?;
        Ok::<(String, String), AppError>((key, url))
    });

    let pairs = try_join_all(resolutions).await?;
    Ok(pairs.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::testing::InMemoryBlobStore;

    #[tokio::test]
    async fn test_resolves_every_key() {
        let store = InMemoryBlobStore::new();
        let keys: Vec<String> = (0..5).map(|i| format!("pictures/{i}")).collect();

        let urls = resolve_urls(keys.clone(), Duration::from_secs(900), &store)
            .await
            .unwrap();

        assert_eq!(urls.len(), 5);
        for key in &keys {
            let url = urls.get(key).unwrap();
            assert!(url.contains(key));
            assert!(url.contains("expires=900"));
        }
    }

    #[tokio::test]
    async fn test_single_failure_fails_whole_batch() {
        // Resolving 5 keys with the 3rd failing must produce an error and no
        // partial URL map.
        let store = InMemoryBlobStore::new().fail_on("pictures/2");
        let keys: Vec<String> = (0..5).map(|i| format!("pictures/{i}")).collect();

        let result = resolve_urls(keys, Duration::from_secs(900), &store).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_duplicate_keys_resolve_once() {
        let store = InMemoryBlobStore::new();
        let keys = vec!["a".to_string(), "a".to_string(), "b".to_string()];
        let urls = resolve_urls(keys, Duration::from_secs(60), &store)
            .await
            .unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty_map() {
        let store = InMemoryBlobStore::new();
        let urls = resolve_urls(Vec::<String>::new(), Duration::from_secs(60), &store)
            .await
            .unwrap();
        assert!(urls.is_empty());
    }
}
