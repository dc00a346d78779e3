//! Pipeline configuration.

use crate::domain::entities::{RetryPolicy, SignerIdentity};
use serde::Deserialize;

/// Runtime configuration for the sealing pipeline.
#[derive(Clone, Debug, Deserialize)]
pub struct SealingConfig {
    /// The identity to seal under.
    pub identity: SignerIdentity,
    /// Backoff policy for retryable signing failures.
    pub retry: RetryPolicy,
}

impl Default for SealingConfig {
    fn default() -> Self {
        Self {
            identity: SignerIdentity::new("seal-key"),
            retry: RetryPolicy::default(),
        }
    }
}
