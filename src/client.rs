//! Module for building the TLS configuration of a KES client.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};

use crate::config::EnvConfig;
use crate::credentials::CredentialSource;
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::prompt::SecretReader;
use crate::tls::{certificate, KeyPair};

/// Build a client TLS configuration that presents `key_pair`.
///
/// Server certificates are checked against the platform's native roots,
/// unless `insecure_skip_verify` is set. Protocol versions and cipher suites
/// are the rustls defaults.
pub fn client_config(key_pair: &KeyPair, insecure_skip_verify: bool) -> Result<Arc<ClientConfig>> {
    let builder = if insecure_skip_verify {
        tracing::warn!("server certificate verification is disabled");
        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(SkipServerVerification::new())
    } else {
        let roots = certificate::get_native_certs().unwrap_or_else(|err| {
            tracing::warn!("failed to load native root certificates: {}", err);
            rustls::RootCertStore::empty()
        });
        ClientConfig::builder().with_root_certificates(roots)
    };
    let config = builder
        .with_client_auth_cert(key_pair.cert_chain().to_vec(), key_pair.private_key().clone_key())
        .map_err(Error::ClientConfig)?;
    Ok(Arc::new(config))
}

/// Everything needed to talk to a KES server as one client identity.
#[derive(Debug, Clone)]
pub struct Client {
    /// Server endpoint, e.g. `https://127.0.0.1:7373`.
    pub endpoint: String,
    /// Enclave requests are scoped to, if any.
    pub enclave: Option<String>,
    /// Identity of the client certificate, if the key type reports one.
    pub identity: Option<Identity>,
    /// TLS configuration presenting the client certificate.
    pub tls: Arc<ClientConfig>,
    pub insecure_skip_verify: bool,
}

impl Client {
    /// Resolve the client credentials from `config` and build the TLS
    /// configuration.
    ///
    /// `enclave` overrides the enclave from the environment. `reader` is only
    /// asked for a password if the private key file is encrypted.
    pub fn from_config(
        config: &EnvConfig,
        enclave: Option<&str>,
        insecure_skip_verify: bool,
        reader: &dyn SecretReader,
    ) -> Result<Self> {
        let source = CredentialSource::resolve(config)?;
        let endpoint = config.server()?.to_string();
        let key_pair = source.key_pair(reader)?;
        let tls = client_config(&key_pair, insecure_skip_verify)?;
        Ok(Self {
            endpoint,
            enclave: config.enclave(enclave).map(String::from),
            identity: key_pair.identity(),
            tls,
            insecure_skip_verify,
        })
    }
}

/// Dummy certificate verifier that treats any certificate as valid.
/// NOTE, such verification is vulnerable to MITM attacks, but convenient for testing.
#[derive(Debug)]
struct SkipServerVerification(Arc<rustls::crypto::CryptoProvider>);

impl SkipServerVerification {
    fn new() -> Arc<Self> {
        Arc::new(Self(Arc::new(rustls::crypto::ring::default_provider())))
    }
}

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_key::ApiKey;
    use rustls::client::ResolvesClientCert;
    use zeroize::Zeroizing;

    struct NoPrompt;

    impl SecretReader for NoPrompt {
        fn read_secret(&self, _prompt: &str) -> Result<Zeroizing<String>> {
            panic!("unexpected password prompt");
        }
    }

    #[test]
    fn presents_client_certificate() {
        let pair = ApiKey::generate().generate_certificate().unwrap();
        let config = client_config(&pair, true).unwrap();
        assert!(config.client_auth_cert_resolver.has_certs());
    }

    #[test]
    fn client_from_api_key() {
        let api_key = ApiKey::generate();
        let config = EnvConfig {
            api_key: Some(api_key.to_string()),
            enclave: Some("tenant-1".into()),
            ..EnvConfig::default()
        };
        let client = Client::from_config(&config, None, true, &NoPrompt).unwrap();
        assert_eq!(client.endpoint, crate::config::DEFAULT_SERVER);
        assert_eq!(client.enclave.as_deref(), Some("tenant-1"));
        assert_eq!(client.identity, Some(api_key.identity()));
        assert!(client.insecure_skip_verify);
    }

    #[test]
    fn conflict_is_reported_before_anything_else() {
        let config = EnvConfig {
            api_key: Some("not-an-api-key".into()),
            client_key: Some("/nonexistent/client.key".into()),
            ..EnvConfig::default()
        };
        let err = Client::from_config(&config, None, false, &NoPrompt).unwrap_err();
        assert!(matches!(err, Error::ConflictingEnv(..)));
    }
}
