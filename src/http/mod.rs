use axum::Router;

use crate::{AppState, RelayState};

mod error;
mod handlers;
mod pages;
mod routes;

pub use error::AppError;
pub use pages::Pages;

/// The photo site: feeds, upload form and healthcheck.
pub fn router(state: AppState) -> Router {
    let upload_max_bytes = state.upload_max_bytes;
    Router::new()
        .merge(routes::health())
        .merge(routes::feed())
        .merge(routes::uploads(upload_max_bytes))
        .with_state(state)
}

/// The chat relay run in `webhook` mode.
pub fn relay_router(state: RelayState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::relay())
        .with_state(state)
}
