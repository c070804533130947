use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One pending write in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvWrite {
    Int(String, i64),
    Bytes(String, Vec<u8>),
}

impl KvWrite {
    #[must_use]
    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::Int(key.into(), value)
    }

    #[must_use]
    pub fn bytes(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self::Bytes(key.into(), value)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            KvWrite::Int(key, _) | KvWrite::Bytes(key, _) => key,
        }
    }
}

/// Key-value persistence contract for quiz statistics.
///
/// `apply` commits a whole batch or nothing, so a crash between sub-updates
/// can never leave the counters contradicting each other or a torn payload.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read an integer value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or when the key holds a
    /// non-integer value.
    async fn get_i64(&self, key: &str) -> Result<Option<i64>, StorageError>;

    /// Read a byte payload.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or when the key holds a
    /// non-byte value.
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Apply all writes atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be committed; on error no
    /// write in the batch is visible.
    async fn apply(&self, writes: &[KvWrite]) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KvValue {
    Int(i64),
    Bytes(Vec<u8>),
}

/// Mutex-map store for tests and as a transient fallback.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, KvValue>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get_i64(&self, key: &str) -> Result<Option<i64>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.get(key) {
            None => Ok(None),
            Some(KvValue::Int(v)) => Ok(Some(*v)),
            Some(KvValue::Bytes(_)) => Err(StorageError::Serialization(format!(
                "key {key} holds bytes, not an integer"
            ))),
        }
    }

    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.get(key) {
            None => Ok(None),
            Some(KvValue::Bytes(v)) => Ok(Some(v.clone())),
            Some(KvValue::Int(_)) => Err(StorageError::Serialization(format!(
                "key {key} holds an integer, not bytes"
            ))),
        }
    }

    async fn apply(&self, writes: &[KvWrite]) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for write in writes {
            match write {
                KvWrite::Int(key, v) => guard.insert(key.clone(), KvValue::Int(*v)),
                KvWrite::Bytes(key, v) => guard.insert(key.clone(), KvValue::Bytes(v.clone())),
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_keys_read_as_none() {
        let store = InMemoryStore::new();
        assert!(store.get_i64("games_count").await.unwrap().is_none());
        assert!(store.get_bytes("best_game").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_writes_are_readable() {
        let store = InMemoryStore::new();
        store
            .apply(&[
                KvWrite::int("games_count", 3),
                KvWrite::bytes("best_game", vec![1, 2, 3]),
            ])
            .await
            .unwrap();
        assert_eq!(store.get_i64("games_count").await.unwrap(), Some(3));
        assert_eq!(
            store.get_bytes("best_game").await.unwrap(),
            Some(vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn kind_mismatch_is_a_serialization_error() {
        let store = InMemoryStore::new();
        store.apply(&[KvWrite::int("games_count", 1)]).await.unwrap();
        let err = store.get_bytes("games_count").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn later_writes_overwrite_earlier_ones() {
        let store = InMemoryStore::new();
        store.apply(&[KvWrite::int("total_correct", 5)]).await.unwrap();
        store.apply(&[KvWrite::int("total_correct", 9)]).await.unwrap();
        assert_eq!(store.get_i64("total_correct").await.unwrap(), Some(9));
    }

    #[test]
    fn store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InMemoryStore>();
    }
}
