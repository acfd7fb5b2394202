//! API keys
//!
//! An API key is an Ed25519 private key in text form:
//!
//! ```text
//! kes:v1:<base64(0x00 || 32-byte seed)>
//! ```
//!
//! Instead of a certificate file, a client holding an API key derives a short
//! lived self-signed certificate for its key on every invocation. The server
//! only cares about the identity of the public key.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::pkcs8::EncodePrivateKey;
use ed25519_dalek::{SigningKey, SECRET_KEY_LENGTH};
use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, KeyUsagePurpose,
};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::tls::KeyPair;

const PREFIX: &str = "kes:v1:";
const TYPE_ED25519: u8 = 0;

// DER SubjectPublicKeyInfo header for an Ed25519 key (RFC 8410).
const ED25519_SPKI_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// How long a certificate derived from an API key is valid.
pub const CERTIFICATE_VALIDITY: Duration = Duration::days(90);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseApiKeyError {
    #[error("missing 'kes:v1:' prefix")]
    MissingPrefix,
    #[error("invalid base64 encoding: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid length {0}")]
    InvalidLength(usize),
    #[error("unsupported key type {0}")]
    UnsupportedType(u8),
}

/// An Ed25519 API key.
#[derive(Clone)]
pub struct ApiKey {
    key: SigningKey,
}

impl ApiKey {
    /// Generate a new random API key.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// The identity of the certificates derived from this key.
    pub fn identity(&self) -> Identity {
        let spki = [
            ED25519_SPKI_PREFIX.as_slice(),
            self.key.verifying_key().as_bytes().as_slice(),
        ]
        .concat();
        Identity::from_spki(&spki)
    }

    /// Derive a self-signed client certificate for this key.
    ///
    /// The certificate's common name is the key's identity. It is valid from
    /// now for [`CERTIFICATE_VALIDITY`] and only usable for client
    /// authentication.
    pub fn generate_certificate(&self) -> Result<KeyPair> {
        let pkcs8 = self
            .key
            .to_pkcs8_der()
            .map_err(|err| Error::KeyPair(err.to_string()))?;
        let pkcs8 = PrivatePkcs8KeyDer::from(pkcs8.as_bytes().to_vec());
        let key_pair = rcgen::KeyPair::from_pkcs8_der_and_sign_algo(&pkcs8, &rcgen::PKCS_ED25519)
            .map_err(Error::CertificateGeneration)?;

        let identity = self.identity();
        let mut params = CertificateParams::default();
        params.distinguished_name = DistinguishedName::new();
        params
            .distinguished_name
            .push(DnType::CommonName, identity.to_string());
        let now = OffsetDateTime::now_utc();
        params.not_before = now;
        params.not_after = now + CERTIFICATE_VALIDITY;
        params.is_ca = IsCa::ExplicitNoCa;
        params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];

        let cert = params
            .self_signed(&key_pair)
            .map_err(Error::CertificateGeneration)?;
        tracing::debug!("generated client certificate for identity {}", identity);

        KeyPair::new(vec![cert.der().clone()], PrivateKeyDer::Pkcs8(pkcs8))
    }
}

impl FromStr for ApiKey {
    type Err = ParseApiKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s.strip_prefix(PREFIX).ok_or(ParseApiKeyError::MissingPrefix)?;
        let decoded = Zeroizing::new(STANDARD.decode(encoded)?);
        if decoded.len() != 1 + SECRET_KEY_LENGTH {
            return Err(ParseApiKeyError::InvalidLength(decoded.len()));
        }
        if decoded[0] != TYPE_ED25519 {
            return Err(ParseApiKeyError::UnsupportedType(decoded[0]));
        }
        let mut seed = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        seed.copy_from_slice(&decoded[1..]);
        Ok(Self {
            key: SigningKey::from_bytes(&seed),
        })
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Zeroizing::new([0u8; 1 + SECRET_KEY_LENGTH]);
        raw[0] = TYPE_ED25519;
        raw[1..].copy_from_slice(self.key.as_bytes());
        write!(f, "{PREFIX}{}", STANDARD.encode(&raw[..]))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}
