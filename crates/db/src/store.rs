use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored value for {0} is not valid utf-8")]
    InvalidValue(String),
    #[error("unsupported storage url: {0}")]
    UnsupportedUrl(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Key/value access to access tokens and the rendered feed.
///
/// Implementations must be safe to share between concurrent requests. Any
/// connection a call acquires is released before the call returns.
#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn get_token(&self, user: &str) -> Result<String, StoreError>;

    async fn get_feed(&self, channel: &str) -> Result<Vec<u8>, StoreError>;

    /// Unconditionally replaces the channel's feed.
    async fn set_feed(&self, channel: &str, content: &[u8]) -> Result<(), StoreError>;

    async fn close(&self) -> Result<(), StoreError>;
}

pub fn token_key(user: &str) -> String {
    format!("user:{user}")
}

pub fn feed_key(channel: &str) -> String {
    format!("feed:{channel}")
}
