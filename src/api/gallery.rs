//! Gallery endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value, json};

use super::forms::Form;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::GalleryItem;
use crate::error::AppError;
use crate::service::{GalleryInput, GalleryService};

fn service(state: &AppState) -> Result<GalleryService, AppError> {
    let backend = state.backend()?;
    Ok(GalleryService::new(
        backend.db.clone(),
        backend.relay.clone(),
    ))
}

/// GET /api/gallery
pub async fn list_gallery(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryItem>>, AppError> {
    Ok(Json(service(&state)?.list().await?))
}

/// POST /api/gallery
pub async fn create_gallery_item(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Form(input): Form<GalleryInput>,
) -> Result<Json<Value>, AppError> {
    let id = service(&state)?.create(input).await?;
    Ok(Json(json!({ "id": id, "message": "Created" })))
}

/// PUT /api/gallery/:id
pub async fn update_gallery_item(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
    Form(input): Form<GalleryInput>,
) -> Result<Json<Value>, AppError> {
    service(&state)?.update(&id, input).await?;
    Ok(Json(json!({ "message": "Updated" })))
}

/// DELETE /api/gallery/:id
pub async fn delete_gallery_item(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    service(&state)?.delete(&id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}
