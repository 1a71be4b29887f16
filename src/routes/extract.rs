//! Request extractors whose rejections use the response envelope.
//!
//! Drop-in replacements for axum's `Json`, `Path`, and `Query`. A body, path
//! segment, or query string that fails to parse answers 400 with
//! `{success: false, message}` instead of axum's plain-text rejection.

use axum::extract::{FromRequest, FromRequestParts};

use crate::routes::response::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);
