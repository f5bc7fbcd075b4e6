//! Works endpoints

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::forms::Form;
use super::json::ApiJson;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::Work;
use crate::error::AppError;
use crate::service::{WorkInput, WorkService};

fn service(state: &AppState) -> Result<WorkService, AppError> {
    let backend = state.backend()?;
    Ok(WorkService::new(backend.db.clone(), backend.relay.clone()))
}

#[derive(Debug, Deserialize)]
pub struct WorksQuery {
    pub category: Option<String>,
}

/// GET /api/works
pub async fn list_works(
    State(state): State<AppState>,
    Query(query): Query<WorksQuery>,
) -> Result<Json<Vec<Work>>, AppError> {
    let works = service(&state)?.list(query.category.as_deref()).await?;
    Ok(Json(works))
}

/// GET /api/works/:id
pub async fn get_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Work>, AppError> {
    Ok(Json(service(&state)?.get(&id).await?))
}

/// POST /api/works
pub async fn create_work(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Form(input): Form<WorkInput>,
) -> Result<Json<Value>, AppError> {
    let id = service(&state)?.create(input).await?;
    Ok(Json(json!({ "id": id, "message": "Created" })))
}

/// PUT /api/works/:id
pub async fn update_work(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
    Form(input): Form<WorkInput>,
) -> Result<Json<Value>, AppError> {
    service(&state)?.update(&id, input).await?;
    Ok(Json(json!({ "message": "Updated" })))
}

/// DELETE /api/works/:id
pub async fn delete_work(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    service(&state)?.delete(&id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}

/// PUT /api/works/sort
pub async fn sort_works(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Value>, AppError> {
    let items = super::sort_items(&body)?;
    service(&state)?.reorder(items).await?;
    Ok(Json(json!({ "message": "Sort order updated" })))
}
