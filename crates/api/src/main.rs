use db::FeedStore;
use feed_core::config::ServerSettings;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

mod error;
mod middleware;
mod routes;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let settings = ServerSettings::from_env()?;
    let addr: SocketAddr = settings.api_bind.parse()?;
    let store = db::open(&settings.storage_url).await?;

    let state = AppState {
        store,
        channel: settings.channel.clone(),
    };

    info!(%addr, team = settings.channel.team(), "starting api");

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            close_store(&state.store).await;
            return Err(err.into());
        }
    };
    serve(listener, state, shutdown_signal()).await?;
    info!("api stopped");

    Ok(())
}

/// Runs the server until `shutdown` resolves, then closes the store
/// whether or not serving failed.
async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = state.store.clone();
    let served = axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown)
        .await;

    close_store(&store).await;
    if let Err(err) = served {
        error!(error = %err, "api server failed");
        return Err(err.into());
    }
    Ok(())
}

async fn close_store(store: &Arc<dyn FeedStore>) {
    if let Err(err) = store.close().await {
        warn!(error = %err, "failed to close store");
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use db::{MemoryStore, StoreError};
    use feed_core::Channel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct ClosingStore {
        inner: MemoryStore,
        closed: AtomicUsize,
    }

    #[async_trait]
    impl FeedStore for ClosingStore {
        async fn get_token(&self, user: &str) -> Result<String, StoreError> {
            self.inner.get_token(user).await
        }

        async fn get_feed(&self, channel: &str) -> Result<Vec<u8>, StoreError> {
            self.inner.get_feed(channel).await
        }

        async fn set_feed(&self, channel: &str, content: &[u8]) -> Result<(), StoreError> {
            self.inner.set_feed(channel, content).await
        }

        async fn close(&self) -> Result<(), StoreError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_serve_closes_store_on_shutdown() {
        let store = Arc::new(ClosingStore::default());
        let state = AppState {
            store: store.clone(),
            channel: Channel::new("example"),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        serve(listener, state, async {}).await.unwrap();

        assert_eq!(store.closed.load(Ordering::SeqCst), 1);
    }
}
