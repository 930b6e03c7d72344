//! Request extractors whose rejections use the JSON error body.

use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// [`axum::Json`] that rejects with [`AppError::Validation`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// [`axum::extract::Query`] that rejects with [`AppError::Validation`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// [`axum::extract::Path`] that rejects with [`AppError::Validation`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
