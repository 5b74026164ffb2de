use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{feed_key, token_key, FeedStore, StoreError};

/// In-process backend, used by tests and `memory://` deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_token(&self, user: &str, token: &str) {
        self.entries
            .write()
            .await
            .insert(token_key(user), token.as_bytes().to_vec());
    }

    async fn get(&self, key: String) -> Result<Vec<u8>, StoreError> {
        self.entries
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound(key))
    }
}

#[async_trait]
impl FeedStore for MemoryStore {
    async fn get_token(&self, user: &str) -> Result<String, StoreError> {
        let key = token_key(user);
        let value = self.get(key.clone()).await?;
        String::from_utf8(value).map_err(|_| StoreError::InvalidValue(key))
    }

    async fn get_feed(&self, channel: &str) -> Result<Vec<u8>, StoreError> {
        self.get(feed_key(channel)).await
    }

    async fn set_feed(&self, channel: &str, content: &[u8]) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(feed_key(channel), content.to_vec());
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_token() {
        let store = MemoryStore::new();
        store.put_token("alice", "right").await;

        assert_eq!(store.get_token("alice").await.unwrap(), "right");
    }

    #[tokio::test]
    async fn test_get_token_unprovisioned_user() {
        let store = MemoryStore::new();
        let err = store.get_token("nobody").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "key not found: user:nobody");
    }

    #[tokio::test]
    async fn test_get_feed_missing() {
        let store = MemoryStore::new();
        assert!(store.get_feed("example").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_set_then_get_feed() {
        let store = MemoryStore::new();
        store.set_feed("example", b"first").await.unwrap();
        assert_eq!(store.get_feed("example").await.unwrap(), b"first".to_vec());

        store.set_feed("example", b"second").await.unwrap();
        assert_eq!(store.get_feed("example").await.unwrap(), b"second".to_vec());
    }

    #[tokio::test]
    async fn test_channels_are_separate_slots() {
        let store = MemoryStore::new();
        store.set_feed("a", b"feed a").await.unwrap();
        store.set_feed("b", b"feed b").await.unwrap();

        assert_eq!(store.get_feed("a").await.unwrap(), b"feed a".to_vec());
        assert_eq!(store.get_feed("b").await.unwrap(), b"feed b".to_vec());
    }

    #[tokio::test]
    async fn test_tokens_and_feeds_do_not_collide() {
        let store = MemoryStore::new();
        store.put_token("example", "token").await;
        store.set_feed("example", b"feed").await.unwrap();

        assert_eq!(store.get_token("example").await.unwrap(), "token");
        assert_eq!(store.get_feed("example").await.unwrap(), b"feed".to_vec());
    }
}
