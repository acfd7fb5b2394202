//! Errors produced while resolving the client identity.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::api_key::ParseApiKeyError;
use crate::tls::decrypt::DecryptError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way credential resolution can fail.
///
/// None of these are retried. The caller reports the message and exits.
#[derive(Error, Debug)]
pub enum Error {
    /// Both an API key and a certificate/key path are configured.
    #[error("two conflicting environment variables set: unset either '{0}' or '{1}'")]
    ConflictingEnv(&'static str, &'static str),

    /// A required environment variable is absent.
    #[error("{what}. Environment variable '{var}' is not set")]
    EnvNotSet {
        /// Name of the variable.
        var: &'static str,
        /// What is missing because of it.
        what: &'static str,
    },

    /// A required environment variable is present but blank.
    #[error("{what}. Environment variable '{var}' is empty")]
    EnvEmpty {
        /// Name of the variable.
        var: &'static str,
        /// What is missing because of it.
        what: &'static str,
    },

    #[error("invalid API key: {0}")]
    MalformedApiKey(#[from] ParseApiKeyError),

    #[error("failed to generate client certificate from API key: {0}")]
    CertificateGeneration(#[source] rcgen::Error),

    #[error("failed to load TLS certificate '{}': {source}", path.display())]
    ReadCertificate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load TLS private key '{}': {source}", path.display())]
    ReadPrivateKey {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load TLS certificate: no PEM-encoded certificate found in '{}'", .0.display())]
    NoCertificate(PathBuf),

    #[error("failed to read TLS private key: no PEM-encoded private key found")]
    NoPrivateKey,

    /// The private key is encrypted but there is no terminal to ask for the password.
    #[error("failed to read private key password: standard error is not a terminal")]
    NotInteractive,

    #[error("failed to read private key password: {0}")]
    Prompt(#[source] io::Error),

    #[error("incorrect password")]
    IncorrectPassword,

    #[error("failed to decrypt private key: {0}")]
    Decrypt(#[source] DecryptError),

    #[error("failed to load TLS private key or certificate: {0}")]
    KeyPair(String),

    #[error("failed to build TLS client configuration: {0}")]
    ClientConfig(#[source] rustls::Error),
}

impl From<DecryptError> for Error {
    fn from(err: DecryptError) -> Self {
        match err {
            DecryptError::IncorrectPassword => Error::IncorrectPassword,
            err => Error::Decrypt(err),
        }
    }
}
