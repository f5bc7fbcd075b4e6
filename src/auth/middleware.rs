//! Authentication middleware
//!
//! Protects routes that require authentication.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use super::token::{Claims, verify_token};
use crate::AppState;
use crate::error::AppError;

/// Token after the scheme in `Authorization: Bearer <token>`
fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split_whitespace().nth(1))
        .map(ToOwned::to_owned)
}

fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<Claims, AppError> {
    let token = extract_token_from_headers(headers).ok_or(AppError::Unauthenticated)?;
    verify_token(&token, &state.config.auth.token_secret, Utc::now())
}

/// Middleware to require authentication
///
/// Missing token: 401. Invalid or expired token: 403.
/// Adds the token's `Claims` to request extensions if valid.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/works/:id", ...)
///     .route_layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(request.headers(), &state)?;
    tracing::debug!(username = %claims.username, "Authenticated request");

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Extractor for the current authenticated user
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(claims): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", claims.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(CurrentUser(claims));
        }

        let state = AppState::from_ref(state);
        let claims = authenticate(&parts.headers, &state)?;
        parts.extensions.insert(claims.clone());

        Ok(CurrentUser(claims))
    }
}
