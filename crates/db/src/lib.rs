pub mod memory;
pub mod pg_store;
pub mod queries;
pub mod redis_store;
mod store;

use std::sync::Arc;

pub use memory::MemoryStore;
pub use pg_store::PgStore;
pub use redis_store::RedisStore;
pub use store::{feed_key, token_key, FeedStore, StoreError};

/// Open the backend named by the connection string scheme.
pub async fn open(url: &str) -> Result<Arc<dyn FeedStore>, StoreError> {
    let scheme = url.split_once("://").map(|(scheme, _)| scheme);
    let store: Arc<dyn FeedStore> = match scheme {
        Some("redis") | Some("rediss") => Arc::new(RedisStore::connect(url).await?),
        Some("postgres") | Some("postgresql") => Arc::new(PgStore::connect(url).await?),
        Some("memory") => Arc::new(MemoryStore::new()),
        _ => return Err(StoreError::UnsupportedUrl(redact(url))),
    };
    Ok(store)
}

// Keep userinfo out of error messages and logs.
fn redact(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => match rest.rsplit_once('@') {
            Some((_, host)) => format!("{scheme}://***@{host}"),
            None => url.to_string(),
        },
        None => "<invalid url>".to_string(),
    }
}
