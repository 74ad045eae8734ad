//! Service settings: YAML file plus `MCSTATUS_*` environment overrides.
//! Used by: main, service, server, state, tls.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
const ENV_PREFIX: &str = "MCSTATUS";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub port: u16,
    #[serde(alias = "bind_address")]
    pub bind_address: String,
    /// Seconds between snapshot refreshes.
    #[serde(alias = "update_interval")]
    pub update_interval: u64,
    pub debug: bool,
    /// Host data directory; relative keystore paths resolve against it.
    #[serde(alias = "data_dir")]
    pub data_dir: PathBuf,
    pub cors: CorsSettings,
    pub security: SecuritySettings,
    pub https: HttpsSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CorsSettings {
    #[serde(alias = "allowed_origins")]
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SecuritySettings {
    #[serde(alias = "enable_auth")]
    pub enable_auth: bool,
    #[serde(alias = "api_key")]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpsSettings {
    pub enabled: bool,
    #[serde(alias = "keystore_path")]
    pub keystore_path: PathBuf,
    #[serde(alias = "keystore_password")]
    pub keystore_password: String,
    #[serde(alias = "keystore_type")]
    pub keystore_type: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".into(),
            update_interval: 10,
            debug: false,
            data_dir: PathBuf::from("."),
            cors: CorsSettings::default(),
            security: SecuritySettings::default(),
            https: HttpsSettings::default(),
        }
    }
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: "*".into(),
        }
    }
}

impl Default for HttpsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            keystore_path: PathBuf::from("ssl/keystore.p12"),
            keystore_password: "changeit".into(),
            keystore_type: "PKCS12".into(),
        }
    }
}

impl Settings {
    /// Loads `path` (missing file means all defaults) and applies environment
    /// overrides such as `MCSTATUS_PORT` or `MCSTATUS_HTTPS__ENABLED`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings: Self = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.update_interval == 0 {
            return Err(Error::InvalidConfig(
                "update-interval must be at least 1 second".into(),
            ));
        }
        if self.security.enable_auth && self.security.api_key.is_empty() {
            return Err(Error::InvalidConfig(
                "security.api-key must be set when security.enable-auth is true".into(),
            ));
        }
        Ok(())
    }

    pub fn update_period(&self) -> Duration {
        Duration::from_secs(self.update_interval.max(1))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn keystore_path(&self) -> PathBuf {
        self.data_dir.join(&self.https.keystore_path)
    }

    /// The bearer token requests must present, when auth is on.
    pub fn api_key(&self) -> Option<&str> {
        self.security
            .enable_auth
            .then_some(self.security.api_key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.port, 8080);
        assert_eq!(s.update_interval, 10);
        assert!(!s.debug);
        assert_eq!(s.cors.allowed_origins, "*");
        assert!(!s.security.enable_auth);
        assert!(!s.https.enabled);
        assert_eq!(s.https.keystore_type, "PKCS12");
        assert_eq!(s.https.keystore_password, "changeit");
        assert_eq!(s.update_period(), Duration::from_secs(10));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(dir.path().join("absent.yml")).unwrap();
        assert_eq!(s.port, 8080);
    }

    #[test]
    fn yaml_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "port: 9090\nupdate-interval: 3\ndebug: true\ncors:\n  allowed-origins: https://example.com\nsecurity:\n  enable-auth: true\n  api-key: s3cret\nhttps:\n  enabled: true\n  keystore-path: certs/server.pem\n  keystore-type: PEM"
        )
        .unwrap();

        let s = Settings::load(&path).unwrap();
        assert_eq!(s.port, 9090);
        assert_eq!(s.update_period(), Duration::from_secs(3));
        assert!(s.debug);
        assert_eq!(s.cors.allowed_origins, "https://example.com");
        assert_eq!(s.api_key(), Some("s3cret"));
        assert!(s.https.enabled);
        assert_eq!(s.https.keystore_type, "PEM");
        assert_eq!(s.keystore_path(), PathBuf::from("./certs/server.pem"));
    }

    #[test]
    fn zero_interval_rejected() {
        let s = Settings {
            update_interval: 0,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn auth_without_key_rejected() {
        let mut s = Settings::default();
        s.security.enable_auth = true;
        assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));
        s.security.api_key = "k".into();
        assert!(s.validate().is_ok());
    }

    #[test]
    fn api_key_only_when_auth_enabled() {
        let mut s = Settings::default();
        s.security.api_key = "k".into();
        assert_eq!(s.api_key(), None);
        s.security.enable_auth = true;
        assert_eq!(s.api_key(), Some("k"));
    }

    #[test]
    fn keystore_path_resolves_against_data_dir() {
        let s = Settings {
            data_dir: PathBuf::from("/srv/plugins/mcstatus"),
            ..Settings::default()
        };
        assert_eq!(
            s.keystore_path(),
            PathBuf::from("/srv/plugins/mcstatus/ssl/keystore.p12")
        );
    }
}
