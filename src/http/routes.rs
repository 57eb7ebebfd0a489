use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::http::handlers;
use crate::{AppState, RelayState};

pub fn health<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/healthcheck", get(handlers::healthcheck))
}

pub fn feed() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/:owner", get(handlers::show_owner))
}

pub fn uploads(upload_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/:owner/add",
            get(handlers::add_page).post(handlers::add_photo),
        )
        .layer(DefaultBodyLimit::max(upload_max_bytes))
}

pub fn relay() -> Router<RelayState> {
    Router::new().route("/new/:name", post(handlers::announce))
}
