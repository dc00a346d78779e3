//! Ledger domain: event kinds, entries, and the certificate projection.

pub mod certificate;
pub mod entities;
