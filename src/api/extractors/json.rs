use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections (bad JSON, wrong field types, missing content type)
/// surface as a 400 `AppError::Validation` body instead of axum's plain-text response.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);
