//! Builds a detached [`Snapshot`] from live host state.

use std::sync::Arc;

use chrono::Utc;

use super::model::{avatar_url, ExtensionInfo, PlayerInfo, Snapshot, PING_UNAVAILABLE};
use crate::host::{HostExtension, HostPlayer, HostState};
use crate::tps::TpsEstimator;

const MIB: u64 = 1024 * 1024;
const ANY_ADDRESS: &str = "0.0.0.0";

pub struct SnapshotProducer {
    host: Arc<dyn HostState>,
    estimator: TpsEstimator,
}

impl SnapshotProducer {
    pub fn new(host: Arc<dyn HostState>, estimator: TpsEstimator) -> Self {
        Self { host, estimator }
    }

    /// Samples the tick rate exactly once per call.
    pub fn produce(&mut self) -> Snapshot {
        let host = &self.host;
        let memory = host.memory();
        let players: Vec<PlayerInfo> = host.online_players().iter().map(player_info).collect();
        let plugins = host.extensions().iter().map(extension_info).collect();
        let ip = match host.bind_ip() {
            ip if ip.is_empty() => ANY_ADDRESS.to_owned(),
            ip => ip,
        };

        Snapshot {
            name: host.server_name(),
            version: host.server_version(),
            api_version: host.api_version(),
            online_mode: host.online_mode(),
            ip,
            port: host.bind_port(),
            tps: self.estimator.sample(),
            max_memory: memory.max_bytes / MIB,
            allocated_memory: memory.allocated_bytes / MIB,
            free_memory: memory.free_bytes / MIB,
            max_players: host.max_players(),
            online_players: u32::try_from(players.len()).unwrap_or(u32::MAX),
            players,
            plugins,
            captured_at: Utc::now(),
        }
    }
}

fn player_info(player: &HostPlayer) -> PlayerInfo {
    PlayerInfo {
        name: player.name.clone(),
        uuid: player.id,
        display_name: player.display_name.clone(),
        ping: player.ping_ms.map_or(PING_UNAVAILABLE, i64::from),
        skin_url: avatar_url(&player.id),
    }
}

fn extension_info(ext: &HostExtension) -> ExtensionInfo {
    ExtensionInfo {
        name: ext.name.clone(),
        version: ext.version.clone(),
        enabled: ext.enabled,
        authors: ext.authors.join(", "),
    }
}
