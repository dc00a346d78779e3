//! Engine configuration.

use serde::Deserialize;

/// Runtime configuration for the envelope engine.
#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
    /// Require at least one bound field per Signer/Approver before `send`.
    pub enforce_completeness: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enforce_completeness: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.enforce_completeness);
    }
}
