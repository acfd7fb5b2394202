//! TLS module for managing certificates and private keys.

pub mod certificate;
pub mod decrypt;
pub mod key;
pub mod pem;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::{CertifiedKey, SigningKey};
use rustls::InconsistentKeys;

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::prompt::SecretReader;

/// A certificate chain together with the private key for its leaf.
///
/// A `KeyPair` only exists once the key has been checked against the leaf
/// certificate.
pub struct KeyPair {
    cert_chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
    signing_key: Arc<dyn SigningKey>,
}

impl KeyPair {
    pub fn new(cert_chain: Vec<CertificateDer<'static>>, key: PrivateKeyDer<'static>) -> Result<Self> {
        let provider = rustls::crypto::ring::default_provider();
        let signing_key = provider
            .key_provider
            .load_private_key(key.clone_key())
            .map_err(|err| Error::KeyPair(err.to_string()))?;

        let certified = CertifiedKey::new(cert_chain.clone(), Arc::clone(&signing_key));
        match certified.keys_match() {
            // Some key types cannot report their public key; trust those.
            Ok(()) | Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => {}
            Err(err) => return Err(Error::KeyPair(err.to_string())),
        }

        Ok(Self {
            cert_chain,
            key,
            signing_key,
        })
    }

    pub fn cert_chain(&self) -> &[CertificateDer<'static>] {
        &self.cert_chain
    }

    pub fn private_key(&self) -> &PrivateKeyDer<'static> {
        &self.key
    }

    /// Identity of the public key, if the key type can report it.
    pub fn identity(&self) -> Option<Identity> {
        self.signing_key
            .public_key()
            .map(|spki| Identity::from_spki(spki.as_ref()))
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self {
            cert_chain: self.cert_chain.clone(),
            key: self.key.clone_key(),
            signing_key: Arc::clone(&self.signing_key),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("certificates", &self.cert_chain.len())
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}

/// Load a key pair from a certificate file and a private key file.
///
/// If the private key is encrypted, `reader` is asked for its password.
pub fn load_key_pair(cert_path: &Path, key_path: &Path, reader: &dyn SecretReader) -> Result<KeyPair> {
    let cert_chain = certificate::load_certs(cert_path)?;
    let key = key::load_key(key_path, reader)?;
    let key_pair = KeyPair::new(cert_chain, key)?;
    tracing::info!(
        "loaded TLS client certificate {} with key {}",
        cert_path.display(),
        key_path.display()
    );
    Ok(key_pair)
}
