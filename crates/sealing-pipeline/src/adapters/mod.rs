//! Single-node adapter implementations.

pub mod certs;
pub mod ed25519;
pub mod memory;
