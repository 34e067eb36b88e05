// src/persistence/sqlite.rs
use super::KvBackend;
use crate::error::AppResult;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Key-value rows in the `kv_store` table.
#[derive(Debug, Clone)]
pub struct SqliteKv {
    pool: SqlitePool,
}

impl SqliteKv {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvBackend for SqliteKv {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        tracing::debug!("kv get '{}': {}", key, if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        // UPSERT, the previous value is replaced as a whole
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
               value = excluded.value,
               updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        tracing::debug!("kv set '{}' ({} bytes)", key, value.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        // Single connection so every query sees the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let kv = SqliteKv::new(memory_pool().await);
        assert_eq!(kv.get("attendify-teachers").await.unwrap(), None);

        kv.set("attendify-teachers", "[]").await.unwrap();
        kv.set("attendify-teachers", r#"[{"id":1}]"#).await.unwrap();

        assert_eq!(
            kv.get("attendify-teachers").await.unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
    }
}
