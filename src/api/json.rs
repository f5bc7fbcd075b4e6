//! JSON body extractor whose rejections use the API error shape

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` with malformed bodies reported as `InvalidInput`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
