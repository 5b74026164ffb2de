use thiserror::Error;

/// Failures of the fetch and render stages.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("upstream request failed: {0}")]
    Upstream(String),
    #[error("failed to decode: {0}")]
    Decode(String),
    #[error("failed to render feed: {0}")]
    Render(String),
}
