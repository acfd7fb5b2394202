//! Credential source selection
//!
//! A client authenticates either with an API key or with a certificate and
//! private key file. Exactly one of the two must be configured.

use std::path::PathBuf;

use crate::api_key::ApiKey;
use crate::config::{EnvConfig, ENV_API_KEY, ENV_CLIENT_CERT, ENV_CLIENT_KEY};
use crate::error::{Error, Result};
use crate::prompt::SecretReader;
use crate::tls::{self, KeyPair};

/// Where the client's TLS identity comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Derive an ephemeral certificate from an API key.
    ApiKey(String),
    /// Load a certificate and a private key from disk.
    FilePair { cert: PathBuf, key: PathBuf },
}

impl CredentialSource {
    /// Pick the credential source configured in `config`.
    ///
    /// An API key must not be combined with a certificate or key path. Without
    /// an API key both paths are required.
    pub fn resolve(config: &EnvConfig) -> Result<Self> {
        if let Some(api_key) = &config.api_key {
            if config.client_cert.is_some() {
                return Err(Error::ConflictingEnv(ENV_API_KEY, ENV_CLIENT_CERT));
            }
            if config.client_key.is_some() {
                return Err(Error::ConflictingEnv(ENV_API_KEY, ENV_CLIENT_KEY));
            }
            return Ok(Self::ApiKey(api_key.clone()));
        }

        let cert = required(
            config.client_cert.as_deref(),
            ENV_CLIENT_CERT,
            "no TLS client certificate",
        )?;
        let key = required(
            config.client_key.as_deref(),
            ENV_CLIENT_KEY,
            "no TLS private key",
        )?;
        Ok(Self::FilePair {
            cert: PathBuf::from(cert),
            key: PathBuf::from(key),
        })
    }

    /// Produce the key pair for this source.
    ///
    /// `reader` is only consulted when a private key file is encrypted.
    pub fn key_pair(&self, reader: &dyn SecretReader) -> Result<KeyPair> {
        match self {
            Self::ApiKey(api_key) => {
                let api_key: ApiKey = api_key.parse()?;
                tracing::info!("using API key with identity {}", api_key.identity());
                api_key.generate_certificate()
            }
            Self::FilePair { cert, key } => tls::load_key_pair(cert, key, reader),
        }
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(..)"),
            Self::FilePair { cert, key } => f
                .debug_struct("FilePair")
                .field("cert", cert)
                .field("key", key)
                .finish(),
        }
    }
}

fn required<'a>(value: Option<&'a str>, var: &'static str, what: &'static str) -> Result<&'a str> {
    match value {
        None => Err(Error::EnvNotSet { var, what }),
        Some(value) if value.trim().is_empty() => Err(Error::EnvEmpty { var, what }),
        Some(value) => Ok(value),
    }
}
