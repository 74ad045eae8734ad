//! Shared application state, rebuilt from settings on every API server start.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::snapshot::SnapshotStore;

pub struct AppStateInner {
    pub store: Arc<SnapshotStore>,
    pub allowed_origin: HeaderValue,
    pub api_key: Option<Box<str>>,
}

pub type AppState = Arc<AppStateInner>;

struct StateBuilder<'a> {
    store: Arc<SnapshotStore>,
    allowed_origin: &'a str,
    api_key: Option<&'a str>,
}

impl StateBuilder<'_> {
    fn build(self) -> Result<AppState> {
        let allowed_origin = HeaderValue::from_str(self.allowed_origin).map_err(|_| {
            Error::InvalidConfig(format!(
                "cors.allowed-origins is not a valid header value: {:?}",
                self.allowed_origin
            ))
        })?;

        let api_key = match self.api_key {
            Some("") => {
                return Err(Error::InvalidConfig(
                    "security.api-key must not be empty when auth is enabled".into(),
                ))
            }
            Some(key) => Some(Box::from(key)),
            None => None,
        };

        if api_key.is_some() {
            tracing::info!("bearer authentication enabled for /api/*");
        }

        Ok(Arc::new(AppStateInner {
            store: self.store,
            allowed_origin,
            api_key,
        }))
    }
}

pub fn build_state(store: Arc<SnapshotStore>, settings: &Settings) -> Result<AppState> {
    StateBuilder {
        store,
        allowed_origin: &settings.cors.allowed_origins,
        api_key: settings.api_key(),
    }
    .build()
}
