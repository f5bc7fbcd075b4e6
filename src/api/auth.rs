//! Login endpoint

use axum::{extract::State, response::Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::json::ApiJson;
use crate::AppState;
use crate::auth::{Claims, issue_token};
use crate::error::AppError;
use crate::metrics::LOGINS_TOTAL;
use crate::service::AccountService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let backend = state.backend()?;

    let result = match (request.username.as_deref(), request.password.as_deref()) {
        (Some(username), Some(password)) => {
            AccountService::new(backend.db.clone())
                .verify_login(username, password)
                .await
        }
        _ => Err(AppError::Unauthorized),
    };

    let user = match result {
        Ok(user) => {
            LOGINS_TOTAL.with_label_values(&["success"]).inc();
            user
        }
        Err(error) => {
            LOGINS_TOTAL.with_label_values(&["failure"]).inc();
            if matches!(error, AppError::Unauthorized) {
                tracing::warn!(username = ?request.username, "Failed login attempt");
            }
            return Err(error);
        }
    };

    let claims = Claims::new(&user.id, &user.username, Utc::now());
    let token = issue_token(&claims, &state.config.auth.token_secret)?;

    tracing::info!(username = %user.username, "Admin logged in");
    Ok(Json(LoginResponse { token }))
}
