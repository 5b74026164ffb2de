use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use feed_core::auth::verify_token;
use tracing::{debug, error};

use crate::{
    error::{ApiResult, AppError, INVALID_USER_TOKEN, TOKEN_REQUIRED, USER_REQUIRED},
    state::{AppState, RequestId},
};

pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml; charset=utf-8";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/feed", get(get_feed))
        .with_state(state)
}

#[derive(Debug, Default)]
struct FeedQuery {
    user: Option<String>,
    token: Option<String>,
}

impl FeedQuery {
    /// Keeps the first value of each parameter and ignores the rest.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "user" => &mut query.user,
                "token" => &mut query.token,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// Serves the cached feed to a user whose token matches the stored one.
async fn get_feed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<impl IntoResponse> {
    let query = FeedQuery::from_pairs(pairs);
    let user = non_empty(query.user)
        .ok_or_else(|| AppError::Auth(USER_REQUIRED).with_request_id(&request_id.0))?;
    let token = non_empty(query.token)
        .ok_or_else(|| AppError::Auth(TOKEN_REQUIRED).with_request_id(&request_id.0))?;

    let stored = match state.store.get_token(&user).await {
        Ok(stored) => Some(stored),
        Err(err) if err.is_not_found() => None,
        Err(err) => {
            error!(request_id = %request_id.0, error = %err, "token lookup failed");
            None
        }
    };

    if !verify_token(stored.as_deref(), &token) {
        return Err(AppError::Auth(INVALID_USER_TOKEN).with_request_id(&request_id.0));
    }

    let feed = match state.store.get_feed(state.channel.team()).await {
        Ok(feed) if !feed.is_empty() => feed,
        Ok(_) => {
            error!(request_id = %request_id.0, "cached feed is empty");
            return Err(AppError::Storage.with_request_id(&request_id.0));
        }
        Err(err) => {
            error!(request_id = %request_id.0, error = %err, "feed lookup failed");
            return Err(AppError::Storage.with_request_id(&request_id.0));
        }
    };

    debug!(request_id = %request_id.0, %user, bytes = feed.len(), "serving feed");
    Ok(([(header::CONTENT_TYPE, ATOM_CONTENT_TYPE)], feed))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::app;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use db::{FeedStore, MemoryStore, StoreError};
    use feed_core::Channel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    const FEED: &[u8] = b"<?xml version=\"1.0\"?>\n<feed xmlns=\"http://www.w3.org/2005/Atom\"></feed>";

    /// Wraps a memory store and counts feed reads.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        feed_reads: AtomicUsize,
        broken_tokens: bool,
    }

    #[async_trait]
    impl FeedStore for RecordingStore {
        async fn get_token(&self, user: &str) -> Result<String, StoreError> {
            if self.broken_tokens {
                return Err(StoreError::InvalidValue(db::token_key(user)));
            }
            self.inner.get_token(user).await
        }

        async fn get_feed(&self, channel: &str) -> Result<Vec<u8>, StoreError> {
            self.feed_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_feed(channel).await
        }

        async fn set_feed(&self, channel: &str, content: &[u8]) -> Result<(), StoreError> {
            self.inner.set_feed(channel, content).await
        }

        async fn close(&self) -> Result<(), StoreError> {
            self.inner.close().await
        }
    }

    async fn seeded(feed: Option<&[u8]>) -> Arc<RecordingStore> {
        let store = Arc::new(RecordingStore::default());
        store.inner.put_token("alice", "right").await;
        if let Some(feed) = feed {
            store.inner.set_feed("example", feed).await.unwrap();
        }
        store
    }

    async fn get(store: Arc<RecordingStore>, uri: &str) -> Response {
        let state = AppState {
            store,
            channel: Channel::new("example"),
        };
        app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_cached_feed_verbatim() {
        let store = seeded(Some(FEED)).await;
        let response = get(store.clone(), "/feed?user=alice&token=right").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], ATOM_CONTENT_TYPE);
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        assert_eq!(&body[..], FEED);
        assert_eq!(store.feed_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_user_required() {
        let store = seeded(Some(FEED)).await;
        let response = get(store.clone(), "/feed?token=right").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "user is required");
        assert_eq!(store.feed_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_user_is_missing() {
        let store = seeded(Some(FEED)).await;
        let response = get(store, "/feed?user=&token=right").await;

        assert_eq!(body_text(response).await, "user is required");
    }

    #[tokio::test]
    async fn test_user_checked_before_token() {
        let store = seeded(Some(FEED)).await;
        let response = get(store, "/feed").await;

        assert_eq!(body_text(response).await, "user is required");
    }

    #[tokio::test]
    async fn test_repeated_user_uses_first_value() {
        let store = seeded(Some(FEED)).await;
        let response = get(store.clone(), "/feed?user=alice&user=bob&token=right").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.feed_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_token_uses_first_value() {
        let store = seeded(Some(FEED)).await;
        let response = get(store.clone(), "/feed?user=alice&token=wrong&token=right").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "invalid user token");
        assert_eq!(store.feed_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_first_user_is_missing() {
        let store = seeded(Some(FEED)).await;
        let response = get(store, "/feed?user=&user=alice&token=right").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "user is required");
    }

    #[test]
    fn test_from_pairs_ignores_unknown_keys() {
        let query = FeedQuery::from_pairs(vec![
            ("page".to_string(), "2".to_string()),
            ("token".to_string(), "right".to_string()),
        ]);

        assert_eq!(query.user, None);
        assert_eq!(query.token.as_deref(), Some("right"));
    }

    #[tokio::test]
    async fn test_token_required() {
        let store = seeded(Some(FEED)).await;
        let response = get(store.clone(), "/feed?user=alice").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "token is required");
        assert_eq!(store.feed_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_token_never_reads_feed() {
        let store = seeded(Some(FEED)).await;
        let response = get(store.clone(), "/feed?user=alice&token=wrong").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "invalid user token");
        assert_eq!(store.feed_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unprovisioned_user_rejected_like_wrong_token() {
        let store = seeded(Some(FEED)).await;
        let wrong = get(store.clone(), "/feed?user=alice&token=wrong").await;
        let unknown = get(store.clone(), "/feed?user=mallory&token=right").await;

        assert_eq!(wrong.status(), unknown.status());
        assert_eq!(body_text(wrong).await, body_text(unknown).await);
        assert_eq!(store.feed_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_token_backend_failure_fails_closed() {
        let store = Arc::new(RecordingStore {
            broken_tokens: true,
            ..Default::default()
        });
        store.inner.set_feed("example", FEED).await.unwrap();

        let response = get(store.clone(), "/feed?user=alice&token=right").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "invalid user token");
        assert_eq!(store.feed_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_feed() {
        let store = seeded(None).await;
        let response = get(store, "/feed?user=alice&token=right").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "failure to get feed");
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let store = seeded(Some(&b""[..])).await;
        let response = get(store, "/feed?user=alice&token=right").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "failure to get feed");
    }

    #[tokio::test]
    async fn test_concurrent_readers() {
        let store = seeded(Some(FEED)).await;
        let state = AppState {
            store: store.clone(),
            channel: Channel::new("example"),
        };
        let router = app(state);

        let requests = (0..8).map(|_| {
            let router = router.clone();
            tokio::spawn(async move {
                router
                    .oneshot(
                        Request::builder()
                            .uri("/feed?user=alice&token=right")
                            .body(Body::empty())
                            .unwrap(),
                    )
                    .await
                    .unwrap()
                    .status()
            })
        });

        for handle in requests.collect::<Vec<_>>() {
            assert_eq!(handle.await.unwrap(), StatusCode::OK);
        }
        assert_eq!(store.feed_reads.load(Ordering::SeqCst), 8);
    }
}
