//! Unified error types for mcstatus.
//! Used by: config, tls, state, server, handlers, guard.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub const UNAUTHORIZED: &str = "Unauthorized";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const NOT_FOUND: &str = "Not found";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unauthorized")]
    Unauthorized,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot load keystore {}: {reason}", path.display())]
    Keystore { path: PathBuf, reason: String },

    #[error("tls error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::UNAUTHORIZED {
            return json_error(status, UNAUTHORIZED);
        }
        tracing::error!(error = %self, detail = ?self, "API error");
        json_error(status, INTERNAL_ERROR)
    }
}

/// Fixed `{"error": "..."}` body. Clients only ever see one of the constants above.
pub fn json_error(status: StatusCode, message: &'static str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub type Result<T> = std::result::Result<T, Error>;
