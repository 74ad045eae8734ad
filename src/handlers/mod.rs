//! HTTP handler modules.
//! Used by: server.

use axum::http::StatusCode;
use axum::response::Response;

use crate::error::{json_error, METHOD_NOT_ALLOWED, NOT_FOUND};

pub mod health;
pub mod status;

pub async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, NOT_FOUND)
}

pub async fn method_not_allowed() -> Response {
    json_error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
}
