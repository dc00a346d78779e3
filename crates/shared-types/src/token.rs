//! Recipient access tokens.
//!
//! Each recipient is addressed by an unguessable bearer token rather than an
//! account login. Tokens compare in constant time.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Length of the raw token in bytes.
pub const TOKEN_LEN: usize = 32;

/// Unguessable bearer token scoped to exactly one recipient.
///
/// # Security
///
/// - 256 bits from the thread-local CSPRNG
/// - Equality is constant-time to avoid timing side channels on lookup paths
///   that compare submitted tokens against stored ones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(#[serde(with = "hex_bytes")] [u8; TOKEN_LEN]);

impl AccessToken {
    /// Generates a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parses a token from its hex rendering.
    ///
    /// Returns `None` if the input is not exactly 64 hex characters.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let raw = hex::decode(s).ok()?;
        let bytes: [u8; TOKEN_LEN] = raw.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Hex rendering used in share links.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for AccessToken {}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(de)?;
        let raw = hex::decode(&s).map_err(serde::de::Error::custom)?;
        raw.try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}
