pub mod feed;
pub mod health;

use axum::{middleware::from_fn, Router};

use crate::middleware::request_id::request_id;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(feed::router(state))
        .layer(from_fn(request_id))
}
