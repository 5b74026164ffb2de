use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use crate::queries::kv;
use crate::store::{feed_key, token_key, FeedStore, StoreError};

/// Postgres backend storing every key in a single `feed_kv` table.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        kv::create_table(&pool).await?;
        Ok(Self { pool })
    }

    async fn get(&self, key: String) -> Result<Vec<u8>, StoreError> {
        match kv::get(&self.pool, &key).await? {
            Some(value) => Ok(value),
            None => Err(StoreError::NotFound(key)),
        }
    }
}

#[async_trait]
impl FeedStore for PgStore {
    async fn get_token(&self, user: &str) -> Result<String, StoreError> {
        let key = token_key(user);
        let value = self.get(key.clone()).await?;
        String::from_utf8(value).map_err(|_| StoreError::InvalidValue(key))
    }

    async fn get_feed(&self, channel: &str) -> Result<Vec<u8>, StoreError> {
        self.get(feed_key(channel)).await
    }

    async fn set_feed(&self, channel: &str, content: &[u8]) -> Result<(), StoreError> {
        let key = feed_key(channel);
        // Dropping the transaction on an error path rolls it back.
        let mut tx = self.pool.begin().await?;
        match kv::get_for_update(&mut *tx, &key).await? {
            Some(_) => kv::update(&mut *tx, &key, content).await?,
            None => kv::insert(&mut *tx, &key, content).await?,
        }
        tx.commit().await?;
        debug!(%key, bytes = content.len(), "feed stored");
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}
