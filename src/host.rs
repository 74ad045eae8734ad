//! Read-only view of the host process that snapshots are built from.
//! Used by: snapshot::producer, tps, service, main.

use uuid::Uuid;

use crate::config::Settings;

/// Live accessors into the host. Calls are treated as instantaneous and
/// side-effect free; every value returned is an owned copy.
pub trait HostState: Send + Sync {
    fn server_name(&self) -> String;
    fn server_version(&self) -> String;
    fn api_version(&self) -> String;
    fn online_mode(&self) -> bool;
    /// Empty when the host listens on every interface.
    fn bind_ip(&self) -> String;
    fn bind_port(&self) -> u16;
    fn max_players(&self) -> u32;
    fn memory(&self) -> MemoryUsage;
    fn online_players(&self) -> Vec<HostPlayer>;
    fn extensions(&self) -> Vec<HostExtension>;
}

/// Optional access to the host engine's own tick-rate counter.
pub trait HostPerformanceProbe: Send + Sync {
    /// Recent ticks per second, or `None` when the host does not expose it.
    fn recent_tps(&self) -> Option<f64>;
}

/// Probe for hosts without an introspectable tick counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl HostPerformanceProbe for NoProbe {
    fn recent_tps(&self) -> Option<f64> {
        None
    }
}

/// Memory figures in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    pub max_bytes: u64,
    pub allocated_bytes: u64,
    pub free_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlayer {
    pub name: String,
    pub id: Uuid,
    pub display_name: String,
    /// Round-trip latency, `None` when the host cannot report it.
    pub ping_ms: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostExtension {
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub authors: Vec<String>,
}

/// A host whose state is fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    pub name: String,
    pub version: String,
    pub api_version: String,
    pub online_mode: bool,
    pub ip: String,
    pub port: u16,
    pub max_players: u32,
    pub memory: MemoryUsage,
    pub players: Vec<HostPlayer>,
    pub extensions: Vec<HostExtension>,
}

impl StaticHost {
    /// Describes this service itself, for running without an embedding host.
    /// There is no managed heap to report, so every memory figure is zero; an
    /// embedding host supplies real figures through its own `HostState`.
    pub fn standalone(settings: &Settings) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").into(),
            version: env!("CARGO_PKG_VERSION").into(),
            api_version: env!("CARGO_PKG_VERSION").into(),
            online_mode: false,
            ip: settings.bind_address.clone(),
            port: settings.port,
            max_players: 0,
            memory: MemoryUsage::default(),
            players: Vec::new(),
            extensions: vec![HostExtension {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                enabled: true,
                authors: Vec::new(),
            }],
        }
    }
}

impl HostState for StaticHost {
    fn server_name(&self) -> String {
        self.name.clone()
    }

    fn server_version(&self) -> String {
        self.version.clone()
    }

    fn api_version(&self) -> String {
        self.api_version.clone()
    }

    fn online_mode(&self) -> bool {
        self.online_mode
    }

    fn bind_ip(&self) -> String {
        self.ip.clone()
    }

    fn bind_port(&self) -> u16 {
        self.port
    }

    fn max_players(&self) -> u32 {
        self.max_players
    }

    fn memory(&self) -> MemoryUsage {
        self.memory
    }

    fn online_players(&self) -> Vec<HostPlayer> {
        self.players.clone()
    }

    fn extensions(&self) -> Vec<HostExtension> {
        self.extensions.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_probe_reports_nothing() {
        assert_eq!(NoProbe.recent_tps(), None);
    }

    #[test]
    fn standalone_host_reflects_settings() {
        let settings = Settings {
            port: 9123,
            ..Settings::default()
        };
        let host = StaticHost::standalone(&settings);
        assert_eq!(host.bind_port(), 9123);
        assert_eq!(host.server_name(), "mcstatus");
        assert!(host.online_players().is_empty());
        assert_eq!(host.extensions().len(), 1);
    }

    #[test]
    fn standalone_memory_is_unmeasured() {
        let memory = StaticHost::standalone(&Settings::default()).memory();
        assert_eq!(memory.max_bytes, 0);
        assert_eq!(memory.allocated_bytes, 0);
        assert_eq!(memory.free_bytes, 0);
    }
}
