//! Thoughts endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value, json};

use super::forms::Form;
use super::json::ApiJson;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::Thought;
use crate::error::AppError;
use crate::service::{ThoughtInput, ThoughtService};

fn service(state: &AppState) -> Result<ThoughtService, AppError> {
    let backend = state.backend()?;
    Ok(ThoughtService::new(
        backend.db.clone(),
        backend.relay.clone(),
    ))
}

/// GET /api/thoughts
pub async fn list_thoughts(State(state): State<AppState>) -> Result<Json<Vec<Thought>>, AppError> {
    Ok(Json(service(&state)?.list().await?))
}

/// GET /api/thoughts/:id
///
/// Counts as a view.
pub async fn get_thought(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Thought>, AppError> {
    Ok(Json(service(&state)?.view(&id).await?))
}

/// POST /api/thoughts
pub async fn create_thought(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Form(input): Form<ThoughtInput>,
) -> Result<Json<Value>, AppError> {
    let id = service(&state)?.create(input).await?;
    Ok(Json(json!({ "id": id, "message": "Created" })))
}

/// PUT /api/thoughts/:id
pub async fn update_thought(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
    Form(input): Form<ThoughtInput>,
) -> Result<Json<Value>, AppError> {
    service(&state)?.update(&id, input).await?;
    Ok(Json(json!({ "message": "Updated" })))
}

/// DELETE /api/thoughts/:id
pub async fn delete_thought(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    service(&state)?.delete(&id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}

/// PUT /api/thoughts/sort
pub async fn sort_thoughts(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Value>, AppError> {
    let items = super::sort_items(&body)?;
    service(&state)?.reorder(items).await?;
    Ok(Json(json!({ "message": "Sort order updated" })))
}
