//! Local ed25519 signer.
//!
//! The single-node `Signer` implementation; remote HSM/KMS signers are other
//! implementations of the same port.

use crate::domain::entities::{SealingError, SignerIdentity};
use crate::ports::Signer;
use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};

/// Signer backed by an in-process ed25519 key.
pub struct Ed25519Signer {
    key_id: String,
    key: SigningKey,
}

impl Ed25519Signer {
    /// Builds a signer from a 32-byte seed.
    #[must_use]
    pub fn from_seed(key_id: impl Into<String>, seed: [u8; 32]) -> Self {
        Self {
            key_id: key_id.into(),
            key: SigningKey::from_bytes(&seed),
        }
    }

    /// Generates a fresh key. For single-node and test use.
    #[must_use]
    pub fn generate(key_id: impl Into<String>) -> Self {
        Self::from_seed(key_id, rand::random())
    }

    /// The public key, for signature verification.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

#[async_trait]
impl Signer for Ed25519Signer {
    async fn sign(&self, bytes: &[u8], identity: &SignerIdentity) -> Result<Vec<u8>, SealingError> {
        if identity.key_id != self.key_id {
            return Err(SealingError::Fatal(format!(
                "unknown key id: {}",
                identity.key_id
            )));
        }
        Ok(self.key.sign(bytes).to_bytes().to_vec())
    }

    fn algorithm(&self) -> &'static str {
        "Ed25519"
    }
}
