use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Writing the value would push the store past its byte quota.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Origin-scoped string key-value storage.
///
/// This is the only persistence seam the link registry talks to: it reads the
/// whole value under one key, mutates it in memory and writes it back.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ── In-memory store ────────────────────────────────────────────────────────

/// Thread-safe in-memory store backed by a DashMap.
///
/// An optional byte quota (sum of key and value lengths across all entries)
/// mimics the limits a browser puts on local storage. A rejected write leaves
/// the previous value untouched.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            quota: Some(quota),
        }
    }

    /// Bytes currently held, excluding the entry under `skip`.
    fn used_bytes_except(&self, skip: &str) -> usize {
        self.inner
            .iter()
            .filter(|e| e.key() != skip)
            .map(|e| e.key().len() + e.value().len())
            .sum()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_except(key) + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }
        self.inner.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("shortenedUrls").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let store = MemoryStore::new();
        store.set("k", "one").await.unwrap();
        store.set("k", "two").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn quota_rejects_oversized_write_and_keeps_old_value() {
        let store = MemoryStore::with_quota(10);
        store.set("k", "12345").await.unwrap();

        let err = store.set("k", "0123456789").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::QuotaExceeded {
                needed: 11,
                quota: 10
            }
        ));
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("12345"));
    }

    #[tokio::test]
    async fn quota_counts_other_keys() {
        let store = MemoryStore::with_quota(8);
        store.set("a", "xxx").await.unwrap();
        // "a"+"xxx" = 4 bytes, "b"+"yyyy" = 5 bytes
        assert!(store.set("b", "yyyy").await.is_err());
        assert!(store.set("b", "yyy").await.is_ok());
    }
}
