//! Request body extractors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor whose rejections render as an [`AppError`].
///
/// A body that is not JSON, lacks a field or has a field of the wrong type
/// answers 400 with the usual `{"error", "code"}` body instead of axum's
/// plain-text 422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
