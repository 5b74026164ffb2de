pub mod auth;
pub mod config;
pub mod error;
pub mod render;
pub mod types;

pub use error::FeedError;
pub use types::{AuthorRef, Channel, ContentItem};
