//! API layer
//!
//! HTTP handlers for:
//! - Public content reads and the contact form
//! - Authenticated content management
//! - Metrics (Prometheus)

mod auth;
pub mod forms;
mod gallery;
pub mod json;
mod links;
mod messages;
pub mod metrics;
mod profile;
mod thoughts;
mod works;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use serde_json::Value;

use crate::AppState;
use crate::auth::require_auth;
use crate::error::AppError;

pub use metrics::metrics_router;

/// Largest accepted request body (several 5 MiB images per form)
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// `items` array of a bulk reorder body
fn sort_items(body: &Value) -> Result<&Value, AppError> {
    match body.get("items") {
        Some(items) if items.is_array() => Ok(items),
        _ => Err(AppError::InvalidInput("items must be an array".to_string())),
    }
}

/// Create the `/api` router
///
/// Routes are split into public and authenticated endpoints. Both halves
/// share paths and differ by method.
pub fn api_router(state: AppState) -> Router<AppState> {
    // Public endpoints (no authentication required)
    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/profile", get(profile::get_profile))
        .route("/works", get(works::list_works))
        .route("/works/:id", get(works::get_work))
        .route("/thoughts", get(thoughts::list_thoughts))
        .route("/thoughts/:id", get(thoughts::get_thought))
        .route("/gallery", get(gallery::list_gallery))
        .route("/messages", post(messages::submit_message))
        .route("/links", get(links::list_links));

    // Authenticated endpoints (require valid token)
    let authenticated_routes = Router::new()
        .route("/profile", put(profile::update_profile))
        // Works
        .route("/works", post(works::create_work))
        .route("/works/sort", put(works::sort_works))
        .route(
            "/works/:id",
            put(works::update_work).delete(works::delete_work),
        )
        // Thoughts
        .route("/thoughts", post(thoughts::create_thought))
        .route("/thoughts/sort", put(thoughts::sort_thoughts))
        .route(
            "/thoughts/:id",
            put(thoughts::update_thought).delete(thoughts::delete_thought),
        )
        // Gallery
        .route("/gallery", post(gallery::create_gallery_item))
        .route(
            "/gallery/:id",
            put(gallery::update_gallery_item).delete(gallery::delete_gallery_item),
        )
        // Messages
        .route("/messages", get(messages::list_messages))
        .route(
            "/messages/:id",
            put(messages::update_message).delete(messages::delete_message),
        )
        // Links
        .route("/links", post(links::create_link))
        .route(
            "/links/:id",
            put(links::update_link).delete(links::delete_link),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public_routes
        .merge(authenticated_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sort_items_requires_an_array() {
        assert!(sort_items(&json!({"items": []})).is_ok());
        assert!(sort_items(&json!({"items": {"id": "a"}})).is_err());
        assert!(sort_items(&json!({})).is_err());
        assert!(sort_items(&json!([])).is_err());
    }
}
