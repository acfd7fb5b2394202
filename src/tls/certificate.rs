//! Certificate handling utilities

use std::{fs, io, path::Path};

use rustls::pki_types::CertificateDer;

use crate::error::{Error, Result};

/// Get the native certificates from the system. return rustls::RootCertStore
pub fn get_native_certs() -> io::Result<rustls::RootCertStore> {
    let mut root_store = rustls::RootCertStore::empty();
    for cert in rustls_native_certs::load_native_certs()? {
        if let Err(err) = root_store.add(cert) {
            tracing::debug!("ignoring native root certificate: {}", err);
        }
    }
    Ok(root_store)
}

/// Load the certificate chain from a PEM file.
///
/// Only `CERTIFICATE` sections are kept, in file order. Every other section in
/// the same file is silently discarded.
pub fn load_certs(cert_path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let read_error = |source| Error::ReadCertificate {
        path: cert_path.to_path_buf(),
        source,
    };
    let cert_chain = fs::read(cert_path).map_err(read_error)?;
    let cert_chain = rustls_pemfile::certs(&mut &*cert_chain)
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    if cert_chain.is_empty() {
        return Err(Error::NoCertificate(cert_path.to_path_buf()));
    }
    tracing::debug!(
        "loaded {} certificate(s) from {}",
        cert_chain.len(),
        cert_path.display()
    );
    Ok(cert_chain)
}
