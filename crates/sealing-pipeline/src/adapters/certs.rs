//! Certificate source adapters.
//!
//! Chains come from inline config or a file on disk; a remote certificate
//! store would be another implementation of the same port.

use crate::domain::entities::{CertificateChain, SealingError, SignerIdentity};
use crate::ports::CertificateSource;
use std::collections::HashMap;
use std::path::PathBuf;

/// Chains loaded from inline configuration, keyed by identity.
pub struct StaticCertificateSource {
    chains: HashMap<String, CertificateChain>,
}

impl StaticCertificateSource {
    /// A source with a single identity and chain.
    #[must_use]
    pub fn single(key_id: impl Into<String>, chain: CertificateChain) -> Self {
        let mut chains = HashMap::new();
        chains.insert(key_id.into(), chain);
        Self { chains }
    }

    /// Adds a chain for another identity.
    #[must_use]
    pub fn with_chain(mut self, key_id: impl Into<String>, chain: CertificateChain) -> Self {
        self.chains.insert(key_id.into(), chain);
        self
    }
}

impl CertificateSource for StaticCertificateSource {
    fn certificate_chain(&self, identity: &SignerIdentity) -> Result<CertificateChain, SealingError> {
        let chain = self
            .chains
            .get(&identity.key_id)
            .cloned()
            .ok_or_else(|| {
                SealingError::Fatal(format!("no certificate chain for key {}", identity.key_id))
            })?;
        if chain.certificates.is_empty() {
            return Err(SealingError::Fatal(format!(
                "empty certificate chain for key {}",
                identity.key_id
            )));
        }
        Ok(chain)
    }
}

/// Single-certificate source reading PEM/DER bytes from disk at seal time.
pub struct FileCertificateSource {
    key_id: String,
    path: PathBuf,
}

impl FileCertificateSource {
    /// Serves `path` as the chain for `key_id`.
    #[must_use]
    pub fn new(key_id: impl Into<String>, path: PathBuf) -> Self {
        Self {
            key_id: key_id.into(),
            path,
        }
    }
}

impl CertificateSource for FileCertificateSource {
    fn certificate_chain(&self, identity: &SignerIdentity) -> Result<CertificateChain, SealingError> {
        if identity.key_id != self.key_id {
            return Err(SealingError::Fatal(format!(
                "no certificate chain for key {}",
                identity.key_id
            )));
        }
        let bytes = std::fs::read(&self.path).map_err(|e| {
            SealingError::Fatal(format!(
                "unreadable certificate {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(CertificateChain::single(bytes))
    }
}
