//! Private key handling utilities

use std::{fs, path::Path};

use ::pem::Pem;
use rustls::pki_types::PrivateKeyDer;
use zeroize::Zeroizing;

use super::{decrypt, pem};
use crate::error::{Error, Result};
use crate::prompt::SecretReader;

const PASSWORD_PROMPT: &str = "Enter password for private key: ";

/// Load the first private key from a PEM file.
///
/// Blocks before the first `PRIVATE KEY` (or `<TYPE> PRIVATE KEY`) block are
/// skipped. If that block is encrypted, `reader` is asked for the password.
pub fn load_key(key_path: &Path, reader: &dyn SecretReader) -> Result<PrivateKeyDer<'static>> {
    let key = fs::read(key_path).map_err(|source| Error::ReadPrivateKey {
        path: key_path.to_path_buf(),
        source,
    })?;
    let key = Zeroizing::new(key);
    let block = pem::find_block(&key, |block| pem::is_private_key(block.tag()))
        .ok_or(Error::NoPrivateKey)?;
    let block = unlock(block, reader)?;
    private_key_der(&block)
}

/// Return `block` in unencrypted form, decrypting it if needed.
pub fn unlock(block: Pem, reader: &dyn SecretReader) -> Result<Pem> {
    if !pem::is_encrypted(&block) {
        return Ok(block);
    }
    tracing::debug!("'{}' block is encrypted, asking for password", block.tag());

    let password = reader.read_secret(PASSWORD_PROMPT)?;
    let der = decrypt::decrypt_block(&block, password.as_bytes())?;
    Ok(Pem::new(block.tag(), der.to_vec()))
}

fn private_key_der(block: &Pem) -> Result<PrivateKeyDer<'static>> {
    let encoded = Zeroizing::new(::pem::encode(block));
    rustls_pemfile::private_key(&mut encoded.as_bytes())
        .map_err(|err| Error::KeyPair(err.to_string()))?
        .ok_or_else(|| Error::KeyPair(format!("unsupported private key type '{}'", block.tag())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FixedPassword {
        password: &'static str,
        asked: Cell<usize>,
    }

    impl FixedPassword {
        fn new(password: &'static str) -> Self {
            Self {
                password,
                asked: Cell::new(0),
            }
        }
    }

    impl SecretReader for FixedPassword {
        fn read_secret(&self, prompt: &str) -> Result<Zeroizing<String>> {
            assert_eq!(prompt, PASSWORD_PROMPT);
            self.asked.set(self.asked.get() + 1);
            Ok(Zeroizing::new(self.password.to_string()))
        }
    }

    fn data(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
    }

    #[test]
    fn plain_key_does_not_prompt() {
        let reader = FixedPassword::new("unused");
        let key = load_key(&data("client.key"), &reader).unwrap();
        assert!(matches!(key, PrivateKeyDer::Sec1(_)));
        assert_eq!(reader.asked.get(), 0);
    }

    #[test]
    fn pkcs8_key() {
        let key = load_key(&data("client-pkcs8.key"), &FixedPassword::new("unused")).unwrap();
        assert!(matches!(key, PrivateKeyDer::Pkcs8(_)));
    }

    #[test]
    fn key_after_certificate() {
        let key = load_key(&data("rsa-combined.pem"), &FixedPassword::new("unused")).unwrap();
        assert!(matches!(key, PrivateKeyDer::Pkcs1(_)));
    }

    #[test]
    fn encrypted_key_matches_plain_key() {
        let reader = FixedPassword::new("correct-horse");
        let decrypted = load_key(&data("client-aes.key"), &reader).unwrap();
        let plain = load_key(&data("client.key"), &reader).unwrap();
        assert_eq!(decrypted.secret_der(), plain.secret_der());
        assert_eq!(reader.asked.get(), 1);
    }

    #[test]
    fn encrypted_des3_key() {
        let reader = FixedPassword::new("correct-horse");
        let decrypted = load_key(&data("rsa-des3.key"), &reader).unwrap();
        let plain = load_key(&data("rsa.key"), &reader).unwrap();
        assert_eq!(decrypted.secret_der(), plain.secret_der());
    }

    #[test]
    fn incorrect_password() {
        let err = load_key(&data("client-aes.key"), &FixedPassword::new("wrong-password"))
            .unwrap_err();
        assert!(matches!(err, Error::IncorrectPassword));
        assert_eq!(err.to_string(), "incorrect password");
    }

    #[test]
    fn no_private_key_never_prompts() {
        let reader = FixedPassword::new("unused");
        let err = load_key(&data("no-key.pem"), &reader).unwrap_err();
        assert!(matches!(err, Error::NoPrivateKey));
        assert_eq!(reader.asked.get(), 0);
    }

    #[test]
    fn missing_file() {
        let err = load_key(Path::new("/nonexistent/client.key"), &FixedPassword::new("unused"))
            .unwrap_err();
        assert!(matches!(err, Error::ReadPrivateKey { .. }));
    }
}
