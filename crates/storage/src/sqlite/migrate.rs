use sqlx::SqlitePool;

use super::SqliteInitError;

pub(super) async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key        TEXT PRIMARY KEY,
                int_value  INTEGER,
                blob_value BLOB
            )
        ",
    )
    .execute(pool)
    .await?;
    Ok(())
}
