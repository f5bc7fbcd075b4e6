//! Profile endpoints

use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use super::forms::Form;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{ProfileInput, ProfileService};

fn service(state: &AppState) -> Result<ProfileService, AppError> {
    let backend = state.backend()?;
    Ok(ProfileService::new(
        backend.db.clone(),
        backend.relay.clone(),
    ))
}

/// GET /api/profile
///
/// Returns `{}` until a profile has been saved.
pub async fn get_profile(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let profile = service(&state)?.get().await?;
    let body = match profile {
        Some(profile) => serde_json::to_value(profile).map_err(|e| AppError::Internal(e.into()))?,
        None => json!({}),
    };
    Ok(Json(body))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Form(input): Form<ProfileInput>,
) -> Result<Json<Value>, AppError> {
    let saved = service(&state)?.save(input).await?;
    let message = if saved.created {
        "Profile created"
    } else {
        "Profile updated"
    };
    Ok(Json(json!({
        "message": message,
        "data": saved.profile,
    })))
}
