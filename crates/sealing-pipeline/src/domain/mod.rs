//! Sealing domain types.

pub mod entities;
