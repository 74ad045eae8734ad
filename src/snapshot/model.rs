//! Immutable snapshot value served by `GET /api/status`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Reported in place of a latency the host could not measure.
pub const PING_UNAVAILABLE: i64 = -1;

const AVATAR_BASE_URL: &str = "https://crafatar.com/avatars";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub name: String,
    pub version: String,
    #[serde(rename = "bukkitVersion")]
    pub api_version: String,
    #[serde(rename = "online")]
    pub online_mode: bool,
    pub ip: String,
    pub port: u16,
    pub tps: f64,
    /// MiB.
    pub max_memory: u64,
    pub allocated_memory: u64,
    pub free_memory: u64,
    pub max_players: u32,
    pub online_players: u32,
    pub players: Vec<PlayerInfo>,
    pub plugins: Vec<ExtensionInfo>,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub name: String,
    pub uuid: Uuid,
    pub display_name: String,
    pub ping: i64,
    pub skin_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionInfo {
    pub name: String,
    pub version: String,
    pub enabled: bool,
    /// Comma-joined author list.
    pub authors: String,
}

pub fn avatar_url(id: &Uuid) -> String {
    format!("{AVATAR_BASE_URL}/{id}?size=64&overlay")
}
