//! TLS termination: keystore loading into a rustls server config.
//! Used by: server.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::config::Settings;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeystoreType {
    /// Password-protected PKCS#12 bundle (`.p12` / `.pfx`).
    Pkcs12,
    /// Certificate chain and private key concatenated in one PEM file.
    Pem,
}

impl FromStr for KeystoreType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PKCS12" | "P12" | "PFX" => Ok(Self::Pkcs12),
            "PEM" => Ok(Self::Pem),
            other => Err(Error::InvalidConfig(format!(
                "unsupported https.keystore-type {other:?} (expected PKCS12 or PEM)"
            ))),
        }
    }
}

struct Identity {
    chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

/// Builds the acceptor for `https.*` settings, resolving the keystore path
/// against the data directory.
pub fn load_acceptor(settings: &Settings) -> Result<TlsAcceptor> {
    let kind: KeystoreType = settings.https.keystore_type.parse()?;
    let path = settings.keystore_path();
    let identity = read_identity(&path, kind, &settings.https.keystore_password)?;

    let mut config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(identity.chain, identity.key)?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    tracing::info!(keystore = %path.display(), ?kind, "HTTPS enabled");
    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn read_identity(path: &Path, kind: KeystoreType, password: &str) -> Result<Identity> {
    let keystore_err = |reason: String| Error::Keystore {
        path: path.to_path_buf(),
        reason,
    };
    let bytes = std::fs::read(path).map_err(|e| keystore_err(e.to_string()))?;

    let identity = match kind {
        KeystoreType::Pem => parse_pem(&bytes),
        KeystoreType::Pkcs12 => parse_pkcs12(&bytes, password),
    }
    .map_err(keystore_err)?;

    if identity.chain.is_empty() {
        return Err(keystore_err("no certificate found".into()));
    }
    Ok(identity)
}

fn parse_pem(bytes: &[u8]) -> std::result::Result<Identity, String> {
    let chain = rustls_pemfile::certs(&mut &bytes[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid certificate: {e}"))?;
    let key = rustls_pemfile::private_key(&mut &bytes[..])
        .map_err(|e| format!("invalid private key: {e}"))?
        .ok_or_else(|| "no private key found".to_string())?;
    Ok(Identity { chain, key })
}

fn parse_pkcs12(bytes: &[u8], password: &str) -> std::result::Result<Identity, String> {
    let store = p12_keystore::KeyStore::from_pkcs12(bytes, password)
        .map_err(|e| format!("cannot open PKCS#12 bundle: {e}"))?;
    let (_alias, entry) = store
        .private_key_chain()
        .ok_or_else(|| "no private key entry found".to_string())?;

    let chain = entry
        .chain()
        .iter()
        .map(|cert| CertificateDer::from(cert.as_der().to_vec()))
        .collect();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(entry.key().to_vec()));
    Ok(Identity { chain, key })
}
