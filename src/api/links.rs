//! Link endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::json::ApiJson;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::Link;
use crate::error::AppError;
use crate::service::{LinkInput, LinkService};

fn service(state: &AppState) -> Result<LinkService, AppError> {
    Ok(LinkService::new(state.backend()?.db.clone()))
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl From<LinkRequest> for LinkInput {
    fn from(request: LinkRequest) -> Self {
        Self {
            name: request.name,
            url: request.url,
        }
    }
}

/// GET /api/links
pub async fn list_links(State(state): State<AppState>) -> Result<Json<Vec<Link>>, AppError> {
    Ok(Json(service(&state)?.list().await?))
}

/// POST /api/links
pub async fn create_link(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    ApiJson(request): ApiJson<LinkRequest>,
) -> Result<Json<Value>, AppError> {
    let id = service(&state)?.create(request.into()).await?;
    Ok(Json(json!({ "id": id, "message": "Created" })))
}

/// PUT /api/links/:id
pub async fn update_link(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<LinkRequest>,
) -> Result<Json<Value>, AppError> {
    service(&state)?.update(&id, request.into()).await?;
    Ok(Json(json!({ "message": "Updated" })))
}

/// DELETE /api/links/:id
pub async fn delete_link(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    service(&state)?.delete(&id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}
