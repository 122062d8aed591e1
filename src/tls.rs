//! TLS configuration for the backend HTTP client.
//!
//! Builds a [`rustls::ClientConfig`] trusting the Mozilla root set from
//! `webpki-roots`, optionally extended with a private CA certificate so
//! the console can talk to a self-hosted custody backend.

use std::path::Path;

use rustls::ClientConfig;

use crate::Result;

/// Builds a [`ClientConfig`] with the public roots plus any certificates
/// found in `extra_ca`.
///
/// # Errors
///
/// Returns [`TidewatchError::Tls`](crate::TidewatchError::Tls) if the PEM
/// file cannot be read, parsed, or contains no certificate.
pub fn build_tls_config(extra_ca: Option<&Path>) -> Result<ClientConfig> {
    let mut root_store = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    if let Some(path) = extra_ca {
        let pem = std::fs::read(path).map_err(|e| {
            crate::TidewatchError::Tls(format!("failed to read {}: {e}", path.display()))
        })?;
        let certs: Vec<_> = rustls_pemfile::certs(&mut &pem[..])
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| crate::TidewatchError::Tls(format!("failed to parse CA PEM: {e}")))?;
        if certs.is_empty() {
            return Err(crate::TidewatchError::Tls(format!(
                "no certificate found in {}",
                path.display()
            )));
        }
        let (added, ignored) = root_store.add_parsable_certificates(certs);
        tracing::info!(added, ignored, path = %path.display(), "loaded extra CA certificates");
    }

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(config)
}
