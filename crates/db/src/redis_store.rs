use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::store::{feed_key, token_key, FeedStore, StoreError};

/// Redis backend. Tokens and feeds are plain string keys.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        // Fail at startup rather than on the first request.
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, ()>(&mut conn).await?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl FeedStore for RedisStore {
    async fn get_token(&self, user: &str) -> Result<String, StoreError> {
        let key = token_key(user);
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(&key).await?;
        value.ok_or(StoreError::NotFound(key))
    }

    async fn get_feed(&self, channel: &str) -> Result<Vec<u8>, StoreError> {
        let key = feed_key(channel);
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn.get(&key).await?;
        value.ok_or(StoreError::NotFound(key))
    }

    async fn set_feed(&self, channel: &str, content: &[u8]) -> Result<(), StoreError> {
        let key = feed_key(channel);
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(&key, content.to_vec()).await?;
        debug!(%key, bytes = content.len(), "feed stored");
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
