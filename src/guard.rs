//! Request middleware: CORS headers and preflight, bearer auth, panic translation.
//! Each stage either continues to the next or answers the request itself.
//! Used by: server.

use std::any::Any;

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::{json_error, Error, INTERNAL_ERROR};
use crate::state::AppState;

/// Paths under this prefix require a bearer token when auth is enabled.
pub const PROTECTED_PREFIX: &str = "/api/";

const DEFAULT_ALLOW_METHODS: &str = "GET";
const DEFAULT_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// What a preflight asked for, echoed back as what is allowed.
#[derive(Debug, Default)]
struct Preflight {
    methods: Option<HeaderValue>,
    headers: Option<HeaderValue>,
}

impl Preflight {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            methods: headers.get(ACCESS_CONTROL_REQUEST_METHOD).cloned(),
            headers: headers.get(ACCESS_CONTROL_REQUEST_HEADERS).cloned(),
        }
    }
}

pub async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let preflight = (request.method() == Method::OPTIONS)
        .then(|| Preflight::from_headers(request.headers()));

    let mut response = match preflight {
        Some(_) => (StatusCode::OK, "\"OK\"").into_response(),
        None => next.run(request).await,
    };

    let preflight = preflight.unwrap_or_default();
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, state.allowed_origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        preflight
            .methods
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOW_METHODS)),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        preflight
            .headers
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOW_HEADERS)),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    if let Some(expected) = state.api_key.as_deref() {
        let path = request.uri().path();
        if path.starts_with(PROTECTED_PREFIX) && !bearer_matches(request.headers(), expected) {
            tracing::debug!(path, "rejected request without a valid bearer token");
            return Err(Error::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}

fn bearer_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == expected)
}

pub fn internal_error_from_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = message, "API handler panicked");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn bearer_must_match_exactly() {
        assert!(bearer_matches(&headers(&[("authorization", "Bearer k1")]), "k1"));
        assert!(!bearer_matches(&headers(&[("authorization", "Bearer k2")]), "k1"));
        assert!(!bearer_matches(&headers(&[("authorization", "bearer k1")]), "k1"));
        assert!(!bearer_matches(&headers(&[("authorization", "Bearer  k1")]), "k1"));
        assert!(!bearer_matches(&headers(&[("authorization", "k1")]), "k1"));
        assert!(!bearer_matches(&HeaderMap::new(), "k1"));
    }

    #[test]
    fn preflight_reads_request_headers() {
        let p = Preflight::from_headers(&headers(&[
            ("access-control-request-method", "PUT"),
            ("access-control-request-headers", "X-Custom"),
        ]));
        assert_eq!(p.methods.unwrap(), "PUT");
        assert_eq!(p.headers.unwrap(), "X-Custom");

        let p = Preflight::from_headers(&HeaderMap::new());
        assert!(p.methods.is_none() && p.headers.is_none());
    }

    #[test]
    fn panic_payloads_become_generic_500() {
        let response = internal_error_from_panic(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = internal_error_from_panic(Box::new(String::from("owned message")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = internal_error_from_panic(Box::new(17_u8));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
