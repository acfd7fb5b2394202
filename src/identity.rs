//! Client identities
//!
//! A KES server does not look at certificate names. It authorizes a client by
//! the SHA-256 hash of the public key in the certificate it presents.

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 of a DER-encoded SubjectPublicKeyInfo.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity([u8; 32]);

impl Identity {
    /// Compute the identity of a DER-encoded SubjectPublicKeyInfo.
    pub fn from_spki(spki: &[u8]) -> Self {
        Self(Sha256::digest(spki).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({self})")
    }
}
