use std::sync::Arc;

use db::FeedStore;
use feed_core::Channel;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FeedStore>,
    pub channel: Channel,
}

#[derive(Debug, Clone)]
pub struct RequestId(pub String);
