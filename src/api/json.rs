//! JSON extractor whose rejections use the API error body.

use axum::extract::FromRequest;

use crate::types::AppError;

/// `axum::Json`, except that a malformed or incomplete body is rejected as
/// [`AppError::InvalidInput`] (`400 {"error": ...}`) instead of axum's
/// plain-text response.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
