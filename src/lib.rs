//! mcstatus: periodic host status snapshots served over an authenticated HTTP(S) API.
//! Used by: binary entrypoint, integration tests.

pub mod config;
pub mod console;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod host;
pub mod scheduler;
pub mod server;
pub mod service;
pub mod snapshot;
pub mod state;
pub mod tls;
pub mod tps;
