use sqlx::Row;

use super::SqliteStore;
use crate::repository::{KeyValueStore, KvWrite, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_i64(&self, key: &str) -> Result<Option<i64>, StorageError> {
        let row = sqlx::query("SELECT int_value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let value: Option<i64> = row.try_get("int_value").map_err(conn)?;
                value
                    .map(Some)
                    .ok_or_else(|| {
                        StorageError::Serialization(format!(
                            "key {key} holds bytes, not an integer"
                        ))
                    })
            }
        }
    }

    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let row = sqlx::query("SELECT blob_value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let value: Option<Vec<u8>> = row.try_get("blob_value").map_err(conn)?;
                value
                    .map(Some)
                    .ok_or_else(|| {
                        StorageError::Serialization(format!(
                            "key {key} holds an integer, not bytes"
                        ))
                    })
            }
        }
    }

    async fn apply(&self, writes: &[KvWrite]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for write in writes {
            let query = sqlx::query(
                r"
                    INSERT INTO kv_entries (key, int_value, blob_value)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        int_value = excluded.int_value,
                        blob_value = excluded.blob_value
                ",
            );
            let query = match write {
                KvWrite::Int(key, v) => query.bind(key).bind(*v).bind(None::<Vec<u8>>),
                KvWrite::Bytes(key, v) => query.bind(key).bind(None::<i64>).bind(v.clone()),
            };
            query.execute(&mut *tx).await.map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        tracing::debug!(writes = writes.len(), "committed kv batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_store() -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn roundtrips_ints_and_bytes() {
        let store = open_store().await;
        store
            .apply(&[
                KvWrite::int("games_count", 7),
                KvWrite::bytes("best_game", b"{\"correct\":7}".to_vec()),
            ])
            .await
            .unwrap();
        assert_eq!(store.get_i64("games_count").await.unwrap(), Some(7));
        assert_eq!(
            store.get_bytes("best_game").await.unwrap(),
            Some(b"{\"correct\":7}".to_vec())
        );
    }

    #[tokio::test]
    async fn missing_keys_read_as_none() {
        let store = open_store().await;
        assert!(store.get_i64("games_count").await.unwrap().is_none());
        assert!(store.get_bytes("best_game").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_value() {
        let store = open_store().await;
        store.apply(&[KvWrite::int("total_questions", 10)]).await.unwrap();
        store.apply(&[KvWrite::int("total_questions", 20)]).await.unwrap();
        assert_eq!(store.get_i64("total_questions").await.unwrap(), Some(20));
    }

    #[tokio::test]
    async fn kind_mismatch_is_a_serialization_error() {
        let store = open_store().await;
        store.apply(&[KvWrite::int("games_count", 1)]).await.unwrap();
        let err = store.get_bytes("games_count").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn batch_is_visible_as_a_whole() {
        let store = open_store().await;
        store
            .apply(&[
                KvWrite::int("games_count", 1),
                KvWrite::int("total_correct", 8),
                KvWrite::int("total_questions", 10),
            ])
            .await
            .unwrap();
        assert_eq!(store.get_i64("games_count").await.unwrap(), Some(1));
        assert_eq!(store.get_i64("total_correct").await.unwrap(), Some(8));
        assert_eq!(store.get_i64("total_questions").await.unwrap(), Some(10));
    }
}
