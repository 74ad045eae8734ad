//! Current snapshot endpoint.
//! Used by: server.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

use crate::error::Result;
use crate::state::AppState;

pub async fn status(State(state): State<AppState>) -> Result<Response> {
    let snapshot = state.store.current();
    let body = serde_json::to_string_pretty(&*snapshot)?;
    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}
