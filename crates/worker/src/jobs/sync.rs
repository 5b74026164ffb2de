use db::{FeedStore, StoreError};
use feed_core::{render, Channel, FeedError};
use thiserror::Error;
use tracing::info;

use crate::client::QiitaClient;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("failed to store feed: {0}")]
    Storage(#[from] StoreError),
}

/// Fetch, render and store the channel's feed once.
///
/// The store is only written after fetching and rendering both succeed, so a
/// failed run leaves the previous feed in place. Returns the entry count.
pub async fn run(
    client: &QiitaClient,
    store: &dyn FeedStore,
    channel: &Channel,
    per_page: Option<u32>,
) -> Result<usize, SyncError> {
    let items = client.list_items(per_page).await?;
    info!(items = items.len(), ?per_page, "fetched items");

    let document = render::render_now(channel, &items)?;
    info!(bytes = document.len(), "rendered feed");

    store.set_feed(channel.team(), &document).await?;
    Ok(items.len())
}
