//! Contact message endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::json::ApiJson;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::Message;
use crate::error::AppError;
use crate::service::{MessageService, NewMessage, record_submission};

fn service(state: &AppState) -> Result<MessageService, AppError> {
    Ok(MessageService::new(state.backend()?.db.clone()))
}

#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// POST /api/messages
///
/// Public. Validation runs before storage is touched.
pub async fn submit_message(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SubmitMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let valid = NewMessage {
        name: request.name,
        email: request.email,
        message: request.message,
    }
    .validate()
    .inspect_err(|_| record_submission("rejected"))?;

    let id = service(&state)?.submit(valid).await?;
    record_submission("accepted");
    Ok(Json(json!({ "id": id, "message": "Message sent" })))
}

/// GET /api/messages
pub async fn list_messages(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(service(&state)?.list().await?))
}

/// PUT /api/messages/:id
pub async fn update_message(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    service(&state)?
        .set_status(&id, request.status.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Updated" })))
}

/// DELETE /api/messages/:id
pub async fn delete_message(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    service(&state)?.delete(&id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}
